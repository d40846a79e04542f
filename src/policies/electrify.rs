use tracing::debug;

use crate::error::Result;
use crate::sim::sampling::{DrawKey, rounded_count};
use crate::sim::types::{Fuel, Mechanism};

use super::types::{Policy, PolicyContext, TargetScope};

/// Electrification mandate.
///
/// A share of matched buildings switches part of its non-electric load to
/// electricity, each building exactly once. Conversions are phased in evenly
/// over the period; the yearly count is recomputed from what remains so
/// rounding error does not accumulate.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectrifyTarget {
    pub scope: TargetScope,
    /// Share of matched buildings that electrify by the end of the period.
    pub bldg_fraction: f64,
    /// Share of each non-electric fuel replaced by electricity.
    pub fuel_substitution_fraction: f64,
    /// Units of displaced fuel served by one unit of electricity.
    pub coefficient_of_performance: f64,
}

impl ElectrifyTarget {
    pub fn new(
        scope: TargetScope,
        bldg_fraction: f64,
        fuel_substitution_fraction: f64,
        coefficient_of_performance: f64,
    ) -> Self {
        Self {
            scope,
            bldg_fraction,
            fuel_substitution_fraction,
            coefficient_of_performance,
        }
    }

    /// Buildings still to convert this year.
    fn conversions_this_year(&self, matched: usize, converted: usize, year: i32) -> usize {
        let total = rounded_count(matched, self.bldg_fraction);
        let outstanding = total.saturating_sub(converted) as f64;
        let remaining_years = f64::from(self.scope.years.years_remaining(year));
        (outstanding / remaining_years).round_ties_even() as usize
    }
}

impl Policy for ElectrifyTarget {
    fn mechanism(&self) -> Mechanism {
        Mechanism::Electrify
    }

    fn scope(&self) -> &TargetScope {
        &self.scope
    }

    fn apply(&self, index: usize, ctx: &mut PolicyContext<'_>) -> Result<()> {
        let year = ctx.year;
        if !self.scope.is_active(year) {
            return Ok(());
        }

        let matched = self.scope.select(ctx.population);
        let (converted, candidates): (Vec<usize>, Vec<usize>) = matched
            .iter()
            .copied()
            .partition(|&b| ctx.states[b].is_electrified());

        let count = self.conversions_this_year(matched.len(), converted.len(), year);
        let key = DrawKey {
            mechanism: self.mechanism(),
            target: index,
            year,
        };
        let chosen = ctx.sampler.sample(key, &candidates, count)?;
        debug!(
            year,
            target = index,
            matched = matched.len(),
            already = converted.len(),
            converting = chosen.len(),
            "electrification draw"
        );

        for &b in &chosen {
            ctx.states[b].electrify(year);

            let start = ctx.energy(year - 1, b);
            let committed = ctx.committed_before(Mechanism::Electrify, b);
            let reduction = &mut ctx.reductions[b][Mechanism::Electrify];

            let mut displaced = 0.0;
            for fuel in Fuel::NON_ELECTRIC {
                let remaining = start[fuel] - committed[fuel];
                let cut = (self.fuel_substitution_fraction * remaining).max(0.0);
                reduction[fuel] = cut;
                displaced += cut;
            }
            reduction[Fuel::Elec] = -displaced / self.coefficient_of_performance;
        }

        Ok(())
    }
}
