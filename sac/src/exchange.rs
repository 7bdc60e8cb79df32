//! The Exchange routes every real address to the unit which owns it.
//!
//! Each storage or peripheral unit occupies one port, selected by the
//! 4-bit unit field of the address.  The Exchange itself knows
//! nothing about what lies behind a port: it forwards the 24-bit
//! local part (V-flag included) and carries the 64-bit highway value
//! back and forth.  Ports are registered at set-up time, so adding a
//! unit never means touching the routing itself.
//!
//! An address whose unit field names an empty port behaves like a
//! wired-but-absent cabinet: reads return 0, writes disappear, and a
//! diagnostic is logged.  Nothing in the machine treats this as a
//! fault.
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};

use tracing::{event, Level};

use base::prelude::*;

use crate::context::Context;
use crate::event::{InputEvent, InputEventError};
use crate::types::Interrupt;

/// One unit hanging off the Exchange.
pub trait ExchangeUnit {
    fn name(&self) -> String;

    /// Read from the unit's address space.  `local` is the 24-bit
    /// local part of the real address; decoding the V-flag within it
    /// belongs to the unit, never to the Exchange.
    fn exchange_read(&mut self, ctx: &Context, local: u32) -> u64;

    fn exchange_write(&mut self, ctx: &Context, local: u32, value: u64);

    /// Advance the unit's own clock by one machine cycle.  Units are
    /// mutually independent: no implementation may depend on the
    /// order in which the cycle driver advances its peers.
    fn advance_cycle(&mut self, ctx: &Context) -> Option<Interrupt>;

    /// Return the unit's registers to their power-on state.  Whether
    /// a backing medium is attached is not part of that state.
    fn reset(&mut self);

    /// Deliver an externally-originated state change.  Units which
    /// have no business with the event reject it.
    fn on_input_event(
        &mut self,
        ctx: &Context,
        input_event: InputEvent,
    ) -> Result<(), InputEventError> {
        let _ = (ctx, input_event);
        Err(InputEventError::InputEventNotValidForDevice)
    }
}

/// The routing table from unit numbers to units.
pub struct ExchangeBus {
    units: BTreeMap<u8, Box<dyn ExchangeUnit>>,
}

impl Debug for ExchangeBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let names: Vec<String> = self
            .units
            .iter()
            .map(|(id, unit)| format!("{id}: {}", unit.name()))
            .collect();
        f.debug_struct("ExchangeBus").field("units", &names).finish()
    }
}

impl ExchangeBus {
    pub fn new() -> ExchangeBus {
        ExchangeBus {
            units: BTreeMap::new(),
        }
    }

    /// Plug a unit into a port.  Two units on one port is a
    /// configuration bug and fails hard.
    pub fn register_unit(&mut self, unit_id: u8, unit: Box<dyn ExchangeUnit>) {
        assert!(unit_id < 16, "exchange unit number {unit_id} does not fit the unit field");
        let name = unit.name();
        let previous = self.units.insert(unit_id, unit);
        if let Some(previous) = previous {
            panic!(
                "exchange unit {unit_id} registered twice ({} then {name})",
                previous.name()
            );
        }
        event!(Level::DEBUG, "unit {unit_id} is {name}");
    }

    pub fn read(&mut self, ctx: &Context, address: RealAddress) -> u64 {
        match self.units.get_mut(&address.unit_id()) {
            Some(unit) => unit.exchange_read(ctx, address.local()),
            None => {
                event!(
                    Level::WARN,
                    "read of {} routed to empty exchange port {}",
                    address,
                    address.unit_id()
                );
                0
            }
        }
    }

    pub fn write(&mut self, ctx: &Context, address: RealAddress, value: u64) {
        match self.units.get_mut(&address.unit_id()) {
            Some(unit) => unit.exchange_write(ctx, address.local(), value),
            None => {
                event!(
                    Level::WARN,
                    "write of {:#x} to {} routed to empty exchange port {}; discarded",
                    value,
                    address,
                    address.unit_id()
                );
            }
        }
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn ExchangeUnit>> {
        self.units.values_mut()
    }

    pub fn on_input_event(
        &mut self,
        ctx: &Context,
        unit_id: u8,
        input_event: InputEvent,
    ) -> Result<(), InputEventError> {
        match self.units.get_mut(&unit_id) {
            Some(unit) => unit.on_input_event(ctx, input_event),
            None => Err(InputEventError::UnknownUnit(unit_id)),
        }
    }

    pub fn reset(&mut self) {
        for unit in self.units.values_mut() {
            unit.reset();
        }
    }
}

impl Default for ExchangeBus {
    /// We're implementing this mainly to keep clippy happy.
    fn default() -> ExchangeBus {
        Self::new()
    }
}
