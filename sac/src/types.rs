use serde::Serialize;

/// An interrupt condition raised by a unit during a cycle.
///
/// This core does not deliver interrupts; delivery belongs to the
/// processor emulation.  A unit that has something to say returns one
/// of these from its cycle advance and the cycle driver drains them
/// from the [`Machine`](crate::Machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interrupt {
    pub number: u8,
}

/// Interrupt number signalled when a drum transfer has passed its
/// last block under the heads.
pub const INTERRUPT_DRUM: u8 = 4;
/// Interrupt number signalled when the console teletype has sent a
/// character (the same condition that sets TCI).
pub const INTERRUPT_CONSOLE: u8 = 7;
