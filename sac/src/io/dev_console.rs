//! Console teletype unit, exchange port 8.
//!
//! The console is a single slow character device.  Its V-store block
//! carries a control line selecting the transfer direction, a data
//! line, and an interrupt-status pair.  A character written to the
//! data line while the control line selects transmit is latched; the
//! transmit-complete interrupt (TCI) does not become visible until
//! the following machine cycle, modelling the serialisation delay of
//! the real device.
use std::fmt::{self, Debug, Formatter};

use tracing::{event, Level};

use base::prelude::*;

use crate::addressmap::CONSOLE_VX_BLOCK;
use crate::context::Context;
use crate::exchange::ExchangeUnit;
use crate::types::{Interrupt, INTERRUPT_CONSOLE};
use crate::vstore::{Line, RegisterFile};

pub const TELETYPE_CONTROL_LINE: u8 = 0;
pub const TELETYPE_DATA_LINE: u8 = 1;
pub const CONSOLE_INTERRUPT_STATUS_LINE: u8 = 2;
pub const CONSOLE_INTERRUPT_CLEAR_LINE: u8 = 3;

/// Control-line mode bit: set selects receive, clear transmit.
pub const TELETYPE_CONTROL_RECEIVE: u64 = 0x1;
/// Transmit-complete interrupt bit of the interrupt-status line (and
/// of the clear line, where writing it back clears the status).
pub const CONSOLE_INTERRUPT_TCI: u64 = 0x2;

pub struct ConsoleUnit {
    regs: RegisterFile,
    /// Character latched for transmission, TCI not yet raised.
    transmit_pending: Option<u8>,
}

impl Debug for ConsoleUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("ConsoleUnit")
            .field("transmit_pending", &self.transmit_pending)
            .finish_non_exhaustive()
    }
}

fn vline(line: u8) -> VStoreAddress {
    VStoreAddress::new(CONSOLE_VX_BLOCK, line)
}

fn build_vstore() -> RegisterFile {
    let mut regs = RegisterFile::new();
    regs.define(vline(TELETYPE_CONTROL_LINE), Line::masked(TELETYPE_CONTROL_RECEIVE));
    regs.define(vline(TELETYPE_DATA_LINE), Line::masked(0xFF));
    regs.define(vline(CONSOLE_INTERRUPT_STATUS_LINE), Line::read_only());
    // The clear line has no readable state of its own; writes to it
    // act on the status line.
    regs.define(vline(CONSOLE_INTERRUPT_CLEAR_LINE), Line::read_only());
    regs
}

impl ConsoleUnit {
    pub fn new() -> ConsoleUnit {
        ConsoleUnit {
            regs: build_vstore(),
            transmit_pending: None,
        }
    }

    fn in_receive_mode(&self) -> bool {
        self.regs.get(vline(TELETYPE_CONTROL_LINE)) & TELETYPE_CONTROL_RECEIVE != 0
    }

    pub fn vx_read(&self, line: u8) -> u64 {
        self.regs.read(vline(line))
    }

    pub fn vx_write(&mut self, ctx: &Context, line: u8, value: u64) {
        match line {
            TELETYPE_DATA_LINE => {
                self.regs.write(vline(line), value);
                if self.in_receive_mode() {
                    event!(
                        Level::DEBUG,
                        "console: data write {:#04x} at cycle {} ignored in receive mode",
                        value,
                        ctx.cycle
                    );
                } else {
                    let ch = (value & 0xFF) as u8;
                    event!(
                        Level::DEBUG,
                        "console: transmitting {:#04x} from cycle {}",
                        ch,
                        ctx.cycle
                    );
                    self.transmit_pending = Some(ch);
                }
            }
            CONSOLE_INTERRUPT_CLEAR_LINE => {
                if value & CONSOLE_INTERRUPT_TCI != 0 {
                    let status = self.regs.get(vline(CONSOLE_INTERRUPT_STATUS_LINE));
                    self.regs.set(
                        vline(CONSOLE_INTERRUPT_STATUS_LINE),
                        status & !CONSOLE_INTERRUPT_TCI,
                    );
                }
            }
            _ => {
                self.regs.write(vline(line), value);
            }
        }
    }
}

impl Default for ConsoleUnit {
    fn default() -> ConsoleUnit {
        ConsoleUnit::new()
    }
}

impl ExchangeUnit for ConsoleUnit {
    fn name(&self) -> String {
        "console teletype".to_string()
    }

    fn exchange_read(&mut self, _ctx: &Context, local: u32) -> u64 {
        match VStoreAddress::from_local(local) {
            Some(vl) if vl.block == CONSOLE_VX_BLOCK => self.vx_read(vl.line),
            Some(vl) => self.regs.read(vl),
            None => {
                event!(
                    Level::TRACE,
                    "console: read of non-V offset {:#x} returns 0",
                    local
                );
                0
            }
        }
    }

    fn exchange_write(&mut self, ctx: &Context, local: u32, value: u64) {
        match VStoreAddress::from_local(local) {
            Some(vl) if vl.block == CONSOLE_VX_BLOCK => self.vx_write(ctx, vl.line, value),
            Some(vl) => self.regs.write(vl, value),
            None => {
                event!(
                    Level::TRACE,
                    "console: write of {:#x} to non-V offset {:#x} discarded",
                    value,
                    local
                );
            }
        }
    }

    fn advance_cycle(&mut self, ctx: &Context) -> Option<Interrupt> {
        if let Some(ch) = self.transmit_pending.take() {
            event!(
                Level::DEBUG,
                "console: transmit of {:#04x} complete at cycle {}",
                ch,
                ctx.cycle
            );
            let status = self.regs.get(vline(CONSOLE_INTERRUPT_STATUS_LINE));
            self.regs.set(
                vline(CONSOLE_INTERRUPT_STATUS_LINE),
                status | CONSOLE_INTERRUPT_TCI,
            );
            Some(Interrupt {
                number: INTERRUPT_CONSOLE,
            })
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.regs.zeroise();
        self.transmit_pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new(0)
    }

    fn tci_visible(console: &ConsoleUnit) -> bool {
        console.vx_read(CONSOLE_INTERRUPT_STATUS_LINE) & CONSOLE_INTERRUPT_TCI != 0
    }

    #[test]
    fn test_transmit_raises_tci_on_the_following_cycle() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_DATA_LINE, u64::from(b'A'));
        // Visible only after the device has had a cycle to serialise.
        assert!(!tci_visible(&console));
        assert_eq!(
            console.advance_cycle(&ctx),
            Some(Interrupt {
                number: INTERRUPT_CONSOLE
            })
        );
        assert!(tci_visible(&console));
        // One interrupt per character.
        assert_eq!(console.advance_cycle(&ctx), None);
    }

    #[test]
    fn test_data_write_in_receive_mode_does_not_transmit() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_CONTROL_LINE, TELETYPE_CONTROL_RECEIVE);
        console.vx_write(&ctx, TELETYPE_DATA_LINE, u64::from(b'A'));
        assert_eq!(console.advance_cycle(&ctx), None);
        assert!(!tci_visible(&console));
    }

    #[test]
    fn test_clear_line_clears_tci() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_DATA_LINE, u64::from(b'A'));
        console.advance_cycle(&ctx);
        assert!(tci_visible(&console));
        console.vx_write(&ctx, CONSOLE_INTERRUPT_CLEAR_LINE, CONSOLE_INTERRUPT_TCI);
        assert!(!tci_visible(&console));
    }

    #[test]
    fn test_clear_line_without_the_tci_bit_is_inert() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_DATA_LINE, u64::from(b'A'));
        console.advance_cycle(&ctx);
        console.vx_write(&ctx, CONSOLE_INTERRUPT_CLEAR_LINE, !CONSOLE_INTERRUPT_TCI);
        assert!(tci_visible(&console));
    }

    #[test]
    fn test_control_line_keeps_only_the_mode_bit() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_CONTROL_LINE, 0xFFFF_FFFF_FFFF_FFFF);
        assert_eq!(
            console.vx_read(TELETYPE_CONTROL_LINE),
            TELETYPE_CONTROL_RECEIVE
        );
    }

    #[test]
    fn test_data_line_keeps_only_a_character() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_DATA_LINE, 0x1234_0041);
        assert_eq!(console.vx_read(TELETYPE_DATA_LINE), 0x41);
    }

    #[test]
    fn test_reset_drops_a_pending_transmission() {
        let ctx = ctx();
        let mut console = ConsoleUnit::new();
        console.vx_write(&ctx, TELETYPE_DATA_LINE, u64::from(b'A'));
        console.reset();
        assert_eq!(console.advance_cycle(&ctx), None);
        assert!(!tci_visible(&console));
        assert_eq!(console.vx_read(TELETYPE_DATA_LINE), 0);
    }
}
