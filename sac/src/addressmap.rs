//! The Exchange port assignments and the V-store map.
//!
//! Ports 0-3 belong to the processor and the local/mass store units,
//! none of which are emulated by this crate; addresses routed to them
//! come back inert unless the hosting program registers something.
//!
//! # Exchange ports
//!
//! | port | unit                              |
//! | ---- | --------------------------------- |
//! | 0    | processor (external)              |
//! | 1    | local store (external)            |
//! | 2    | mass store (external)             |
//! | 3    | spare                             |
//! | 4-7  | fixed-head disc (drum) units 0-3  |
//! | 8    | console                           |
//!
//! # V-store blocks
//!
//! Each drum unit answers block 4 of its own V-store space; the
//! console answers block 6.  Line assignments are given in the unit
//! modules (`io::dev_drum`, `io::dev_console`).
use base::prelude::*;

/// Exchange port of drum unit 0; drums `n` occupy `DRUM_UNIT_BASE + n`.
pub const DRUM_UNIT_BASE: u8 = 4;
/// Number of drum units fitted.
pub const DRUM_UNITS: u8 = 4;
/// Exchange port of the console.
pub const CONSOLE_UNIT: u8 = 8;

/// V-store block answered by each drum unit.
pub const DRUM_VX_BLOCK: u8 = 4;
/// V-store block answered by the console.
pub const CONSOLE_VX_BLOCK: u8 = 6;

/// The real address which the Exchange maps onto line `line` of drum
/// unit `drum`'s V-store.
pub fn ra_vx_drum(drum: u8, line: u8) -> RealAddress {
    assert!(drum < DRUM_UNITS, "no drum unit {drum} is fitted");
    RealAddress::vstore(
        DRUM_UNIT_BASE + drum,
        VStoreAddress::new(DRUM_VX_BLOCK, line),
    )
}

/// The real address which the Exchange maps onto line `line` of the
/// console's V-store.
pub fn ra_vx_console(line: u8) -> RealAddress {
    RealAddress::vstore(CONSOLE_UNIT, VStoreAddress::new(CONSOLE_VX_BLOCK, line))
}
