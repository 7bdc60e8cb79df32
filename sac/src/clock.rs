//! Simulation of elapsed machine time.

use crate::context::Context;

/// Clock is a source of machine cycles for a cycle driver.  Its run
/// rate is whatever the driver makes it: a driver may burn through
/// cycles as fast as the host allows or pace them against wall time.
///
/// ```
/// use sac::{BasicClock, Clock};
/// let mut clk = BasicClock::new();
/// clk.consume(3);
/// assert_eq!(clk.now().cycle, 3);
/// ```
pub trait Clock {
    /// Retrieves the current (simulated) cycle as a [`Context`].
    fn now(&self) -> Context;

    /// Record that `cycles` machine cycles have been simulated.
    fn consume(&mut self, cycles: u64);
}

/// BasicClock simply counts consumed cycles.
#[derive(Debug, Default)]
pub struct BasicClock {
    elapsed_cycles: u64,
}

impl BasicClock {
    pub fn new() -> BasicClock {
        BasicClock { elapsed_cycles: 0 }
    }
}

impl Clock for BasicClock {
    fn now(&self) -> Context {
        Context::new(self.elapsed_cycles)
    }

    fn consume(&mut self, cycles: u64) {
        self.elapsed_cycles += cycles;
    }
}
