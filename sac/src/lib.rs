//! This crate emulates the store-access side of the MU5 complex: the
//! Exchange which routes real addresses to their owning units, the
//! V-store register protocol through which software controls the
//! peripherals, and the peripheral units themselves.
#![crate_name = "sac"]

mod addressmap;
mod clock;
mod context;
mod event;
mod exchange;
mod io;
mod machine;
mod types;
mod vstore;

pub use addressmap::*;
pub use clock::{BasicClock, Clock};
pub use context::Context;
pub use event::{InputEvent, InputEventError};
pub use exchange::{ExchangeBus, ExchangeUnit};
pub use io::*;
pub use machine::Machine;
pub use types::*;
pub use vstore::{Line, RegisterFile};
