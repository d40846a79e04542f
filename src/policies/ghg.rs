use crate::error::Result;
use crate::sim::sampling::{DrawKey, rounded_count};
use crate::sim::types::{Fuel, FuelVector, Mechanism};

use super::aggregate::IntensityAggregate;
use super::types::{Policy, PolicyContext, TargetScope, annual_step, distribute};

/// How a GHG target's emission level is defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GhgGoal {
    /// Mean emission intensity of the compliant subset in this year.
    ReferenceYear(i32),
    /// Fractional cut from emissions in the year before the period starts.
    ReductionFraction(f64),
    /// Absolute emission intensity in kgCO2e/ft².
    Intensity(f64),
}

/// Greenhouse-gas emission target applied to a randomly chosen compliant subset.
#[derive(Debug, Clone, PartialEq)]
pub struct GhgTarget {
    pub scope: TargetScope,
    pub goal: GhgGoal,
    /// Share of matched buildings that comply (0.0-1.0).
    pub compliance_fraction: f64,
}

impl GhgTarget {
    pub fn new(scope: TargetScope, goal: GhgGoal, compliance_fraction: f64) -> Self {
        Self {
            scope,
            goal,
            compliance_fraction,
        }
    }

    /// Compliant buildings for this target, drawn once on first use and reused
    /// for every active year of the target.
    fn compliant(&self, index: usize, ctx: &mut PolicyContext<'_>) -> Result<Vec<usize>> {
        if let Some(set) = ctx.compliant_sets.get(&index) {
            return Ok(set.clone());
        }
        let matched = self.scope.select(ctx.population);
        let count = rounded_count(matched.len(), self.compliance_fraction);
        let key = DrawKey {
            mechanism: self.mechanism(),
            target: index,
            year: ctx.year,
        };
        let set = ctx.sampler.sample(key, &matched, count)?;
        ctx.compliant_sets.insert(index, set.clone());
        Ok(set)
    }
}

impl Policy for GhgTarget {
    fn mechanism(&self) -> Mechanism {
        Mechanism::Ghg
    }

    fn scope(&self) -> &TargetScope {
        &self.scope
    }

    fn apply(&self, index: usize, ctx: &mut PolicyContext<'_>) -> Result<()> {
        let year = ctx.year;
        let years = self.scope.years;
        if !years.contains(year) {
            return Ok(());
        }

        let members = self.compliant(index, ctx)?;
        if members.is_empty() {
            return Ok(());
        }
        if years.is_first(year) {
            for &b in &members {
                ctx.states[b].clock_mut(Mechanism::Ghg).begin_period(year);
            }
        }

        let factors = *ctx.emission_factors;
        let aggregate = match self.goal {
            GhgGoal::ReferenceYear(reference_year) => IntensityAggregate::mean_intensity(
                ctx.population,
                ctx.history,
                &members,
                reference_year,
                &factors,
            ),
            GhgGoal::ReductionFraction(_) | GhgGoal::Intensity(_) => None,
        };

        for &b in &members {
            let Some(start_year) = ctx.states[b].clock(Mechanism::Ghg).start_year() else {
                continue;
            };
            let target = match self.goal {
                GhgGoal::ReferenceYear(_) => match &aggregate {
                    Some(agg) => agg.target_for(ctx.population.area(b)),
                    None => continue,
                },
                GhgGoal::ReductionFraction(fraction) => {
                    ctx.energy(years.start - 1, b).weighted_total(&factors) * (1.0 - fraction)
                }
                GhgGoal::Intensity(value) => value * ctx.population.area(b),
            };

            let baseline = ctx.energy(start_year - 1, b).weighted(&factors);
            let step = annual_step(baseline.total(), target, years.years_remaining(start_year));
            let emissions_cut = distribute(step, &baseline);

            let committed = ctx.committed_before(Mechanism::Ghg, b);
            let mut reduction = FuelVector::ZERO;
            for fuel in Fuel::ALL {
                if factors[fuel] > 0.0 {
                    let energy_cut = emissions_cut[fuel] / factors[fuel];
                    reduction[fuel] = (energy_cut - committed[fuel]).max(0.0);
                }
            }
            ctx.reductions[b][Mechanism::Ghg] = reduction;
        }

        if years.is_last(year) {
            for &b in &members {
                ctx.states[b].period_ended(Mechanism::Ghg, year);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::testing::{Fixture, test_factors};
    use crate::policies::types::YearRange;
    use crate::sim::sampling::{Sampler, SeedPolicy};

    fn scope(start: i32, end: i32) -> TargetScope {
        TargetScope::new(YearRange::new(start, end))
    }

    #[test]
    fn reduction_fraction_cuts_emissions_and_keeps_mix() {
        let mut fx = Fixture::uniform(1, 1000.0, FuelVector::new(0.0, 1000.0, 1000.0));
        let target = GhgTarget::new(scope(2021, 2021), GhgGoal::ReductionFraction(0.2), 1.0);

        fx.apply(2021, &target).unwrap();

        // A 20% cut in emissions, distributed by each fuel's emission share,
        // is a 20% cut of each fuel's energy.
        let r = fx.reductions[0][Mechanism::Ghg];
        assert!((r[Fuel::Gas] - 200.0).abs() < 1e-9);
        assert!((r[Fuel::Steam] - 200.0).abs() < 1e-9);
        assert_eq!(r[Fuel::Elec], 0.0);
    }

    #[test]
    fn absolute_intensity_target() {
        let f = test_factors();
        let mut fx = Fixture::uniform(1, 1000.0, FuelVector::new(0.0, 1000.0, 0.0));
        // Current intensity: 52.98 kg / 1000 ft². Target half of that.
        let value = 0.5 * 1000.0 * f[Fuel::Gas] / 1000.0;
        let target = GhgTarget::new(scope(2021, 2021), GhgGoal::Intensity(value), 1.0);

        fx.apply(2021, &target).unwrap();
        assert!((fx.reductions[0][Mechanism::Ghg][Fuel::Gas] - 500.0).abs() < 1e-6);
    }

    #[test]
    fn reference_year_uses_compliant_mean() {
        let mut fx = Fixture::new(&[
            ("Office", 1000.0, FuelVector::new(0.0, 1000.0, 0.0)),
            ("Office", 1000.0, FuelVector::new(0.0, 3000.0, 0.0)),
        ]);
        let target = GhgTarget::new(scope(2021, 2021), GhgGoal::ReferenceYear(2020), 1.0);

        fx.apply(2021, &target).unwrap();
        assert_eq!(fx.reductions[0][Mechanism::Ghg], FuelVector::ZERO);
        assert!((fx.reductions[1][Mechanism::Ghg][Fuel::Gas] - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn earlier_mechanisms_are_subtracted() {
        let mut fx = Fixture::uniform(1, 1000.0, FuelVector::new(0.0, 1000.0, 0.0));
        fx.reductions[0][Mechanism::Tuneup] = FuelVector::new(0.0, 100.0, 0.0);
        fx.reductions[0][Mechanism::Eui] = FuelVector::new(0.0, 50.0, 0.0);
        let target = GhgTarget::new(scope(2021, 2021), GhgGoal::ReductionFraction(0.2), 1.0);

        fx.apply(2021, &target).unwrap();
        assert!((fx.reductions[0][Mechanism::Ghg][Fuel::Gas] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn only_the_compliant_fraction_is_affected() {
        let mut fx = Fixture::uniform(10, 1000.0, FuelVector::new(0.0, 1000.0, 0.0));
        let target = GhgTarget::new(scope(2021, 2022), GhgGoal::ReductionFraction(0.5), 0.4);

        fx.apply(2021, &target).unwrap();
        let affected: Vec<usize> = (0..10)
            .filter(|&b| fx.reductions[b][Mechanism::Ghg][Fuel::Gas] > 0.0)
            .collect();
        assert_eq!(affected.len(), 4);

        // The same subset stays compliant in later years of the target.
        fx.next_year();
        fx.apply(2022, &target).unwrap();
        let again: Vec<usize> = (0..10)
            .filter(|&b| fx.reductions[b][Mechanism::Ghg][Fuel::Gas] > 0.0)
            .collect();
        assert_eq!(affected, again);
    }

    #[test]
    fn compliant_subset_is_reproducible() {
        let draw = || {
            let mut fx = Fixture::uniform(50, 1000.0, FuelVector::new(0.0, 1000.0, 0.0));
            fx.sampler = Sampler::new(11, SeedPolicy::PerRun);
            let target = GhgTarget::new(scope(2021, 2021), GhgGoal::ReductionFraction(0.5), 0.3);
            fx.apply(2021, &target).unwrap();
            fx.compliant_sets[&0].clone()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn period_end_restarts_tuneup_and_eui_for_compliant_only() {
        let mut fx = Fixture::uniform(4, 1000.0, FuelVector::new(0.0, 1000.0, 0.0));
        let target = GhgTarget::new(scope(2021, 2021), GhgGoal::ReductionFraction(0.5), 0.5);

        fx.apply(2021, &target).unwrap();
        let compliant = fx.compliant_sets[&0].clone();
        for b in 0..4 {
            let staged = fx.states[b].clock(Mechanism::Tuneup).next_start_year();
            if compliant.contains(&b) {
                assert_eq!(staged, Some(2022));
            } else {
                assert_eq!(staged, None);
            }
        }
    }
}
