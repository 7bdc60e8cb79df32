//! This module holds the peripheral units which hang off the
//! Exchange and speak the V-store register protocol.
//!
//! Every unit owns its registers outright (one register file per
//! unit, nothing shared), decodes the V-flagged part of its own
//! address space, and is advanced one machine cycle at a time by the
//! cycle driver.  Advancing unit A never needs to see unit B.
//!
//! ## Units fitted as standard
//!
//! Exchange ports 4-7: fixed-head disc (drum) units 0-3.
//! Exchange port 8: the console teletype.
use crate::addressmap::{CONSOLE_UNIT, DRUM_UNITS, DRUM_UNIT_BASE};
use crate::exchange::ExchangeBus;

mod dev_console;
mod dev_drum;

pub use dev_console::{
    ConsoleUnit, CONSOLE_INTERRUPT_CLEAR_LINE, CONSOLE_INTERRUPT_STATUS_LINE,
    CONSOLE_INTERRUPT_TCI, TELETYPE_CONTROL_LINE, TELETYPE_CONTROL_RECEIVE, TELETYPE_DATA_LINE,
};
pub use dev_drum::{
    DrumUnit, TransferPhase, BLOCKS_PER_BAND, COMPLETE_ADDRESS_LINE, CURRENT_POSITIONS_LINE,
    DISC_ADDRESS_LINE, DISC_STATUS_LINE, STORE_ADDRESS_LINE,
};

/// Plug the standard unit complement into an exchange.
pub fn set_up_peripherals(bus: &mut ExchangeBus) {
    for drum in 0..DRUM_UNITS {
        bus.register_unit(DRUM_UNIT_BASE + drum, Box::new(DrumUnit::new(drum)));
    }
    bus.register_unit(CONSOLE_UNIT, Box::new(ConsoleUnit::new()));
}
