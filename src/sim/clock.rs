/// A calendar-year clock advancing one year at a time over an inclusive range.
///
/// # Examples
///
/// ```
/// use bepsim::sim::clock::YearClock;
///
/// let mut clock = YearClock::new(2021, 2023);
/// let mut years = Vec::new();
///
/// clock
///     .try_run(|year| {
///         years.push(year);
///         Ok::<(), ()>(())
///     })
///     .unwrap();
/// assert_eq!(years, vec![2021, 2022, 2023]);
/// ```
pub struct YearClock {
    /// Next year to hand out
    current: i32,
    /// Last year (inclusive)
    last: i32,
}

impl YearClock {
    /// Creates a clock over `first..=last`. An empty range yields no years.
    pub fn new(first: i32, last: i32) -> Self {
        Self {
            current: first,
            last,
        }
    }

    /// Advances the clock by one year.
    ///
    /// # Returns
    ///
    /// * `Some(year)` - The year to compute
    /// * `None` - If the last year has already been handed out
    pub fn tick(&mut self) -> Option<i32> {
        if self.current <= self.last {
            let year = self.current;
            self.current += 1;
            Some(year)
        } else {
            None
        }
    }

    /// Runs `f` for each remaining year, stopping at the first error.
    pub fn try_run<E>(&mut self, mut f: impl FnMut(i32) -> Result<(), E>) -> Result<(), E> {
        while let Some(year) = self.tick() {
            f(year)?;
        }
        Ok(())
    }
}
