use crate::error::Result;
use crate::sim::types::{Fuel, FuelVector, Mechanism};

use super::aggregate::IntensityAggregate;
use super::types::{Policy, PolicyContext, TargetScope, annual_step, distribute};

/// Unit weights: EUI is plain site energy per square foot.
const SITE_ENERGY: FuelVector = FuelVector([1.0; 3]);

/// Energy-use-intensity target.
///
/// Every matched building is pushed toward the mean EUI its peer group had in
/// `reference_year`. The required cut in total energy is amortized over the
/// period and split across fuels by each fuel's share of the amortization
/// baseline, preserving the building's fuel mix.
#[derive(Debug, Clone, PartialEq)]
pub struct EuiTarget {
    pub scope: TargetScope,
    /// Year whose population-average EUI becomes the target.
    pub reference_year: i32,
}

impl EuiTarget {
    pub fn new(scope: TargetScope, reference_year: i32) -> Self {
        Self {
            scope,
            reference_year,
        }
    }
}

impl Policy for EuiTarget {
    fn mechanism(&self) -> Mechanism {
        Mechanism::Eui
    }

    fn scope(&self) -> &TargetScope {
        &self.scope
    }

    fn apply(&self, _index: usize, ctx: &mut PolicyContext<'_>) -> Result<()> {
        let year = ctx.year;
        let years = self.scope.years;
        if !years.contains(year) {
            return Ok(());
        }

        let members = self.scope.select(ctx.population);
        if years.is_first(year) {
            for &b in &members {
                ctx.states[b].clock_mut(Mechanism::Eui).begin_period(year);
            }
        }

        let Some(aggregate) = IntensityAggregate::mean_intensity(
            ctx.population,
            ctx.history,
            &members,
            self.reference_year,
            &SITE_ENERGY,
        ) else {
            return Ok(());
        };

        for &b in &members {
            let Some(start_year) = ctx.states[b].clock(Mechanism::Eui).start_year() else {
                continue;
            };
            let baseline = ctx.energy(start_year - 1, b);
            let target = aggregate.target_for(ctx.population.area(b));
            let step = annual_step(baseline.total(), target, years.years_remaining(start_year));
            let mut reduction = distribute(step, &baseline);

            let tuneup = ctx.reductions[b][Mechanism::Tuneup];
            for fuel in Fuel::ALL {
                reduction[fuel] = (reduction[fuel] - tuneup[fuel]).max(0.0);
            }
            ctx.reductions[b][Mechanism::Eui] = reduction;
        }

        if years.is_last(year) {
            for &b in &members {
                ctx.states[b].period_ended(Mechanism::Eui, year);
            }
        }

        Ok(())
    }
}
