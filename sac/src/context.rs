//! This module manages the context in which the emulator is
//! performing a single operation.
//!
//! The peripheral units of this machine are not clocked against wall
//! time: everything advances in whole machine cycles, one angular
//! position of each drum per cycle.  The cycle driver owns the count
//! and hands it to every emulator entry point, so that a log line can
//! always say *when* (in machine time) something happened.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Number of the machine cycle being simulated.
    pub cycle: u64,
}

impl Context {
    #[must_use]
    pub fn new(cycle: u64) -> Context {
        Context { cycle }
    }
}
