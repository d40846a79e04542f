use crate::error::Result;
use crate::sim::types::{Fuel, FuelVector, Mechanism};

use super::types::{Policy, PolicyContext, TargetScope, annual_step};

/// Tune-up requirement: cut every fuel by a fixed fraction over the period.
///
/// Each fuel's target is `(1 - reduction_fraction)` times the building's
/// energy in the year before the period starts. The gap between the current
/// amortization baseline and that target is spread evenly over the years
/// left in the period.
///
/// # Examples
///
/// ```
/// use bepsim::policies::tuneup::TuneupTarget;
/// use bepsim::policies::types::{TargetScope, YearRange};
///
/// let target = TuneupTarget::new(TargetScope::new(YearRange::new(2021, 2021)), 0.1);
/// assert_eq!(target.reduction_fraction, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TuneupTarget {
    pub scope: TargetScope,
    /// Fraction of each fuel removed by the end of the period (0.0-1.0).
    pub reduction_fraction: f64,
}

impl TuneupTarget {
    pub fn new(scope: TargetScope, reduction_fraction: f64) -> Self {
        Self {
            scope,
            reduction_fraction,
        }
    }
}

impl Policy for TuneupTarget {
    fn mechanism(&self) -> Mechanism {
        Mechanism::Tuneup
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
                ctx.states[b].clock_mut(Mechanism::Tuneup).begin_period(year);
            }
        }

        for &b in &members {
            let Some(start_year) = ctx.states[b].clock(Mechanism::Tuneup).start_year() else {
                continue;
            };
            let baseline = ctx.energy(start_year - 1, b);
            let anchor = ctx.energy(years.start - 1, b);
            let periods = years.years_remaining(start_year);

            let mut reduction = FuelVector::ZERO;
            for fuel in Fuel::ALL {
                let target = anchor[fuel] * (1.0 - self.reduction_fraction);
                reduction[fuel] = annual_step(baseline[fuel], target, periods);
            }
            ctx.reductions[b][Mechanism::Tuneup] = reduction;
        }

        if years.is_last(year) {
            for &b in &members {
                ctx.states[b].period_ended(Mechanism::Tuneup, year);
            }
        }

        Ok(())
    }
}
