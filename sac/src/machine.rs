//! The assembled machine: an Exchange with the standard unit
//! complement plugged in, plus the cycle driver.
//!
//! The hosting program owns a [`Machine`] and a clock.  Each machine
//! cycle it calls [`Machine::tick`], then drains any interrupts the
//! peripherals raised during that cycle and delivers them to whatever
//! stands in for the processor.
use std::mem;

use tracing::{event, Level};

use base::prelude::*;

use crate::addressmap::DRUM_UNIT_BASE;
use crate::context::Context;
use crate::event::{InputEvent, InputEventError};
use crate::exchange::ExchangeBus;
use crate::io::set_up_peripherals;
use crate::types::Interrupt;

#[derive(Debug)]
pub struct Machine {
    bus: ExchangeBus,
    pending_interrupts: Vec<Interrupt>,
}

impl Machine {
    pub fn new() -> Machine {
        let mut bus = ExchangeBus::new();
        set_up_peripherals(&mut bus);
        Machine {
            bus,
            pending_interrupts: Vec::new(),
        }
    }

    /// Advance every unit by one machine cycle, gathering the
    /// interrupts they raise.
    pub fn tick(&mut self, ctx: &Context) {
        for unit in self.bus.units_mut() {
            if let Some(interrupt) = unit.advance_cycle(ctx) {
                event!(
                    Level::TRACE,
                    "cycle {}: {} raised interrupt {}",
                    ctx.cycle,
                    unit.name(),
                    interrupt.number
                );
                self.pending_interrupts.push(interrupt);
            }
        }
    }

    /// Take the interrupts raised since the last drain.  Ordering
    /// within a cycle follows unit number, not priority; arbitration
    /// is the processor's business.
    pub fn drain_interrupts(&mut self) -> Vec<Interrupt> {
        mem::take(&mut self.pending_interrupts)
    }

    pub fn exchange_read(&mut self, ctx: &Context, address: RealAddress) -> u64 {
        self.bus.read(ctx, address)
    }

    pub fn exchange_write(&mut self, ctx: &Context, address: RealAddress, value: u64) {
        self.bus.write(ctx, address, value)
    }

    pub fn on_input_event(
        &mut self,
        ctx: &Context,
        unit_id: u8,
        input_event: InputEvent,
    ) -> Result<(), InputEventError> {
        self.bus.on_input_event(ctx, unit_id, input_event)
    }

    /// Put a medium on drum unit `drum` (numbered from 0).
    pub fn attach_drum(&mut self, ctx: &Context, drum: u8) -> Result<(), InputEventError> {
        self.on_input_event(ctx, DRUM_UNIT_BASE + drum, InputEvent::AttachDrumMedium)
    }

    pub fn detach_drum(&mut self, ctx: &Context, drum: u8) -> Result<(), InputEventError> {
        self.on_input_event(ctx, DRUM_UNIT_BASE + drum, InputEvent::DetachDrumMedium)
    }

    /// Master clear.  Every unit returns to its power-on register
    /// state; undelivered interrupts are dropped with it.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.pending_interrupts.clear();
    }
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressmap::{ra_vx_console, ra_vx_drum};
    use crate::io::{
        BLOCKS_PER_BAND, CONSOLE_INTERRUPT_CLEAR_LINE, CONSOLE_INTERRUPT_STATUS_LINE,
        CONSOLE_INTERRUPT_TCI, CURRENT_POSITIONS_LINE, DISC_ADDRESS_LINE, DISC_STATUS_LINE,
        TELETYPE_DATA_LINE,
    };
    use crate::types::{INTERRUPT_CONSOLE, INTERRUPT_DRUM};

    fn ctx() -> Context {
        Context::new(0)
    }

    #[test]
    fn test_positions_read_through_the_exchange() {
        let ctx = ctx();
        let mut machine = Machine::new();
        for _ in 0..5 {
            machine.tick(&ctx);
        }
        // Every drum has rotated in step; each reports its own field.
        for drum in 0..4 {
            let word = machine.exchange_read(&ctx, ra_vx_drum(drum, CURRENT_POSITIONS_LINE));
            assert_eq!(word, 5 << position_field_shift(drum));
        }
    }

    #[test]
    fn test_positions_wrap_after_a_full_revolution() {
        let ctx = ctx();
        let mut machine = Machine::new();
        for _ in 0..BLOCKS_PER_BAND {
            machine.tick(&ctx);
        }
        let word = machine.exchange_read(&ctx, ra_vx_drum(0, CURRENT_POSITIONS_LINE));
        assert_eq!(word, 0);
    }

    #[test]
    fn test_drum_transfer_end_to_end() {
        let ctx = ctx();
        let mut machine = Machine::new();
        machine.attach_drum(&ctx, 1).unwrap();
        // Read one block from block 2 of drum 1.
        machine.exchange_write(
            &ctx,
            ra_vx_drum(1, DISC_ADDRESS_LINE),
            (1 << 30) | (2 << 8) | 1,
        );
        let flags = u64::from(DISC_STATUS_ILLEGAL_REQUEST | DISC_STATUS_DECODE);
        let status = machine.exchange_read(&ctx, ra_vx_drum(1, DISC_STATUS_LINE));
        assert_eq!(status & flags, 0);
        machine.tick(&ctx); // position 1
        machine.tick(&ctx); // position 2: transfer begins
        assert!(machine.drain_interrupts().is_empty());
        machine.tick(&ctx); // the single block moves
        assert_eq!(
            machine.drain_interrupts(),
            vec![Interrupt {
                number: INTERRUPT_DRUM
            }]
        );
        // Drained means drained.
        assert!(machine.drain_interrupts().is_empty());
    }

    #[test]
    fn test_request_to_unattached_drum_sets_the_flags() {
        let ctx = ctx();
        let mut machine = Machine::new();
        machine.exchange_write(&ctx, ra_vx_drum(0, DISC_ADDRESS_LINE), (2 << 8) | 1);
        let flags = u64::from(DISC_STATUS_ILLEGAL_REQUEST | DISC_STATUS_DECODE);
        let status = machine.exchange_read(&ctx, ra_vx_drum(0, DISC_STATUS_LINE));
        assert_eq!(status & flags, flags);
        // No transfer, so no interrupt ever comes.
        for _ in 0..(2 * BLOCKS_PER_BAND) {
            machine.tick(&ctx);
        }
        assert!(machine.drain_interrupts().is_empty());
    }

    #[test]
    fn test_console_transmit_end_to_end() {
        let ctx = ctx();
        let mut machine = Machine::new();
        machine.exchange_write(&ctx, ra_vx_console(TELETYPE_DATA_LINE), u64::from(b'Q'));
        let status = machine.exchange_read(&ctx, ra_vx_console(CONSOLE_INTERRUPT_STATUS_LINE));
        assert_eq!(status & CONSOLE_INTERRUPT_TCI, 0);
        machine.tick(&ctx);
        assert_eq!(
            machine.drain_interrupts(),
            vec![Interrupt {
                number: INTERRUPT_CONSOLE
            }]
        );
        let status = machine.exchange_read(&ctx, ra_vx_console(CONSOLE_INTERRUPT_STATUS_LINE));
        assert_eq!(status & CONSOLE_INTERRUPT_TCI, CONSOLE_INTERRUPT_TCI);
        machine.exchange_write(
            &ctx,
            ra_vx_console(CONSOLE_INTERRUPT_CLEAR_LINE),
            CONSOLE_INTERRUPT_TCI,
        );
        let status = machine.exchange_read(&ctx, ra_vx_console(CONSOLE_INTERRUPT_STATUS_LINE));
        assert_eq!(status & CONSOLE_INTERRUPT_TCI, 0);
    }

    #[test]
    fn test_unregistered_port_is_inert() {
        let ctx = ctx();
        let mut machine = Machine::new();
        let address = RealAddress::new(3, 0x1234);
        machine.exchange_write(&ctx, address, 0xDEAD);
        assert_eq!(machine.exchange_read(&ctx, address), 0);
    }

    #[test]
    fn test_input_event_for_an_unknown_unit_is_rejected() {
        let ctx = ctx();
        let mut machine = Machine::new();
        assert_eq!(
            machine.on_input_event(&ctx, 15, InputEvent::AttachDrumMedium),
            Err(InputEventError::UnknownUnit(15))
        );
    }

    #[test]
    fn test_input_event_for_the_wrong_device_is_rejected() {
        let ctx = ctx();
        let mut machine = Machine::new();
        assert_eq!(
            machine.on_input_event(&ctx, 8, InputEvent::AttachDrumMedium),
            Err(InputEventError::InputEventNotValidForDevice)
        );
    }

    #[test]
    fn test_reset_returns_the_machine_to_power_on_state() {
        let ctx = ctx();
        let mut machine = Machine::new();
        machine.attach_drum(&ctx, 0).unwrap();
        machine.exchange_write(&ctx, ra_vx_drum(0, DISC_ADDRESS_LINE), (1 << 8) | 1);
        machine.tick(&ctx);
        machine.reset();
        assert!(machine.drain_interrupts().is_empty());
        let word = machine.exchange_read(&ctx, ra_vx_drum(0, CURRENT_POSITIONS_LINE));
        assert_eq!(word, 0);
        // The tied-high bit of the disc-address line comes back up.
        assert_eq!(
            machine.exchange_read(&ctx, ra_vx_drum(0, DISC_ADDRESS_LINE)),
            0x8000_0000
        );
    }
}
