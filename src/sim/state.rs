//! Per-building amortization bookkeeping.
//!
//! Each amortized mechanism keeps a clock recording the year its current
//! amortization period began. When one mechanism's period ends, or a building
//! electrifies, the other clocks are staged to restart the following year so
//! their baselines are re-read from the most recent energy levels.

use super::types::Mechanism;

/// Start-year clock for one amortized mechanism.
///
/// `next_start_year` is staged during a year and becomes `start_year` at the
/// year boundary via [`AmortizationClock::roll_over`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmortizationClock {
    start_year: Option<i32>,
    next_start_year: Option<i32>,
}

impl AmortizationClock {
    /// Year the current amortization period began, if any.
    pub fn start_year(&self) -> Option<i32> {
        self.start_year
    }

    /// Value that becomes `start_year` at the next year boundary.
    pub fn next_start_year(&self) -> Option<i32> {
        self.next_start_year
    }

    /// A target period begins in `year`.
    ///
    /// The period starts now, and keeps starting from `year` in later years
    /// unless a restart was already staged for `year + 1`.
    pub fn begin_period(&mut self, year: i32) {
        self.start_year = Some(year);
        if self.next_start_year != Some(year + 1) {
            self.next_start_year = Some(year);
        }
    }

    /// Stage a restart of the amortization baseline at `year + 1`.
    pub fn stage_restart(&mut self, year: i32) {
        self.next_start_year = Some(year + 1);
    }

    /// Apply the staged start year at a year boundary.
    pub fn roll_over(&mut self) {
        self.start_year = self.next_start_year;
    }
}

/// Mutable per-building state owned by the engine for one scenario run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildingState {
    clocks: [AmortizationClock; 3],
    electrification_year: Option<i32>,
}

impl BuildingState {
    /// Clock for an amortized mechanism.
    ///
    /// # Panics
    ///
    /// Panics if called with [`Mechanism::Electrify`], which has no clock.
    pub fn clock(&self, mechanism: Mechanism) -> &AmortizationClock {
        assert!(mechanism.is_amortized(), "{mechanism} has no amortization clock");
        &self.clocks[mechanism.index()]
    }

    /// Mutable clock for an amortized mechanism.
    ///
    /// # Panics
    ///
    /// Panics if called with [`Mechanism::Electrify`].
    pub fn clock_mut(&mut self, mechanism: Mechanism) -> &mut AmortizationClock {
        assert!(mechanism.is_amortized(), "{mechanism} has no amortization clock");
        &mut self.clocks[mechanism.index()]
    }

    /// `ending`'s period ends in `year`: every other amortized mechanism restarts next year.
    pub fn period_ended(&mut self, ending: Mechanism, year: i32) {
        for mechanism in Mechanism::AMORTIZED {
            if mechanism != ending {
                self.clock_mut(mechanism).stage_restart(year);
            }
        }
    }

    pub fn electrification_year(&self) -> Option<i32> {
        self.electrification_year
    }

    pub fn is_electrified(&self) -> bool {
        self.electrification_year.is_some()
    }

    /// Marks the building electrified in `year` and restarts every amortized
    /// mechanism the following year.
    ///
    /// Returns `false` and leaves the state untouched if the building was
    /// already electrified.
    pub fn electrify(&mut self, year: i32) -> bool {
        if self.electrification_year.is_some() {
            return false;
        }
        self.electrification_year = Some(year);
        for mechanism in Mechanism::AMORTIZED {
            self.clock_mut(mechanism).stage_restart(year);
        }
        true
    }

    /// Year-boundary transition for every clock.
    pub fn roll_over(&mut self) {
        for clock in &mut self.clocks {
            clock.roll_over();
        }
    }
}
