//! Fixed-head disc (drum) unit, exchange ports 4-7.
//!
//! Each unit is a rotating store: a set of concentric bands, each
//! holding [`BLOCKS_PER_BAND`] blocks which pass under the fixed
//! heads one per machine cycle.  The unit keeps an angular position
//! counter which advances whether or not anybody is transferring;
//! a request written to the disc-address line is validated at once
//! but no data can move until the rotation has brought the requested
//! starting block under the heads.
//!
//! ## V-store lines (block 4)
//!
//! | line | register          |                                        |
//! | ---- | ----------------- | -------------------------------------- |
//! | 0    | disc address      | packed request word, decoded on write  |
//! | 1    | store address     | 28-bit store offset, plain masked      |
//! | 2    | disc status       | clear-on-write-1 flags                 |
//! | 3    | current positions | read-only, live rotation counter       |
//! | 4    | complete address  | 28-bit store offset, plain masked      |
//!
//! The disc-status unit-number field reads 0 whatever was stored in
//! it; the hardware tied the read path to unit 0 and the emulation
//! preserves the quirk.
use std::fmt::{self, Debug, Formatter};

use serde::Serialize;
use tracing::{event, Level};

use base::prelude::*;

use crate::addressmap::DRUM_VX_BLOCK;
use crate::context::Context;
use crate::event::{InputEvent, InputEventError};
use crate::exchange::ExchangeUnit;
use crate::types::{Interrupt, INTERRUPT_DRUM};
use crate::vstore::{Line, RegisterFile};

pub const DISC_ADDRESS_LINE: u8 = 0;
pub const STORE_ADDRESS_LINE: u8 = 1;
pub const DISC_STATUS_LINE: u8 = 2;
pub const CURRENT_POSITIONS_LINE: u8 = 3;
pub const COMPLETE_ADDRESS_LINE: u8 = 4;

/// Blocks passing the heads in one full revolution.
pub const BLOCKS_PER_BAND: u32 = 37;

/// Where a unit is in the life of a transfer request.
///
/// A request sits in `AwaitingRotation` until the angular position
/// reaches its starting block; while it waits the status line shows
/// neither success nor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferPhase {
    Idle,
    AwaitingRotation,
    Transferring,
}

pub struct DrumUnit {
    id: u8,
    position: u32,
    blocks_per_band: u32,
    attached: bool,
    regs: RegisterFile,
    phase: TransferPhase,
    request: Option<DiscAddress>,
    blocks_remaining: u32,
}

impl Debug for DrumUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("DrumUnit")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("attached", &self.attached)
            .field("phase", &self.phase)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

fn vline(line: u8) -> VStoreAddress {
    VStoreAddress::new(DRUM_VX_BLOCK, line)
}

fn build_vstore() -> RegisterFile {
    let mut regs = RegisterFile::new();
    regs.define(
        vline(DISC_ADDRESS_LINE),
        Line::masked(u64::from(DISC_ADDRESS_WRITE_MASK))
            .with_fixed_ones(u64::from(DISC_ADDRESS_FIXED_ONES)),
    );
    regs.define(
        vline(STORE_ADDRESS_LINE),
        Line::masked(u64::from(STORE_ADDRESS_MASK)),
    );
    regs.define(
        vline(DISC_STATUS_LINE),
        Line::clear_on_write_ones(u64::from(DISC_STATUS_WRITE_MASK))
            .with_read_transform(|v| v & !u64::from(DISC_STATUS_UNIT_FIELD)),
    );
    regs.define(vline(CURRENT_POSITIONS_LINE), Line::read_only());
    regs.define(
        vline(COMPLETE_ADDRESS_LINE),
        Line::masked(u64::from(STORE_ADDRESS_MASK)),
    );
    regs
}

impl DrumUnit {
    pub fn new(id: u8) -> DrumUnit {
        DrumUnit {
            id,
            position: 0,
            blocks_per_band: BLOCKS_PER_BAND,
            attached: false,
            regs: build_vstore(),
            phase: TransferPhase::Idle,
            request: None,
            blocks_remaining: 0,
        }
    }

    /// The live angular position, in blocks from the index mark.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn transfer_phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn vx_read(&self, line: u8) -> u64 {
        match line {
            // The only line that follows the rotation directly.
            CURRENT_POSITIONS_LINE => {
                u64::from(self.position) << position_field_shift(self.id)
            }
            _ => self.regs.read(vline(line)),
        }
    }

    pub fn vx_write(&mut self, ctx: &Context, line: u8, value: u64) {
        self.regs.write(vline(line), value);
        if line == DISC_ADDRESS_LINE {
            self.decode_request(ctx);
        }
    }

    /// Validate the request now stored in the disc-address line.
    ///
    /// An illegal request raises the decode and illegal-request flags
    /// together and is dropped; a legal one clears them and waits for
    /// the rotation.
    fn decode_request(&mut self, ctx: &Context) {
        let request = DiscAddress::from_stored(self.regs.get(vline(DISC_ADDRESS_LINE)) as u32);
        let illegal = !self.attached
            || request.block() >= self.blocks_per_band
            || request.size() == 0
            || request.size() > self.blocks_per_band;
        let status = self.regs.get(vline(DISC_STATUS_LINE));
        let flags = u64::from(DISC_STATUS_ILLEGAL_REQUEST | DISC_STATUS_DECODE);
        // The stored unit field echoes the request; the read path
        // hides it again.
        let status = (status & !u64::from(DISC_STATUS_UNIT_FIELD)) | u64::from(request.disc());
        if illegal {
            event!(
                Level::DEBUG,
                "drum {}: illegal request at cycle {}: {} (attached={})",
                self.id,
                ctx.cycle,
                request,
                self.attached
            );
            self.regs.set(vline(DISC_STATUS_LINE), status | flags);
            self.phase = TransferPhase::Idle;
            self.request = None;
        } else {
            if self.phase != TransferPhase::Idle {
                event!(
                    Level::DEBUG,
                    "drum {}: request superseded before completion",
                    self.id
                );
            }
            event!(
                Level::DEBUG,
                "drum {}: request accepted at cycle {}: {} (position {})",
                self.id,
                ctx.cycle,
                request,
                self.position
            );
            self.regs.set(vline(DISC_STATUS_LINE), status & !flags);
            self.phase = TransferPhase::AwaitingRotation;
            self.request = Some(request);
        }
    }

    /// One block passes the heads.  Runs every machine cycle, whether
    /// or not a request is outstanding; never looks at another unit.
    fn step_rotation(&mut self, ctx: &Context) -> Option<Interrupt> {
        self.position = (self.position + 1) % self.blocks_per_band;
        match (self.phase, self.request) {
            (TransferPhase::AwaitingRotation, Some(request))
                if self.position == request.block() =>
            {
                event!(
                    Level::DEBUG,
                    "drum {}: rotated into position {} at cycle {}, transfer begins",
                    self.id,
                    self.position,
                    ctx.cycle
                );
                self.phase = TransferPhase::Transferring;
                self.blocks_remaining = request.size();
                None
            }
            (TransferPhase::Transferring, Some(request)) => {
                self.blocks_remaining -= 1;
                if self.blocks_remaining == 0 {
                    event!(
                        Level::DEBUG,
                        "drum {}: transfer of {} blocks complete at cycle {}",
                        self.id,
                        request.size(),
                        ctx.cycle
                    );
                    self.phase = TransferPhase::Idle;
                    self.request = None;
                    Some(Interrupt {
                        number: INTERRUPT_DRUM,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl ExchangeUnit for DrumUnit {
    fn name(&self) -> String {
        format!("fixed-head disc unit {}", self.id)
    }

    fn exchange_read(&mut self, _ctx: &Context, local: u32) -> u64 {
        match VStoreAddress::from_local(local) {
            Some(vl) if vl.block == DRUM_VX_BLOCK => self.vx_read(vl.line),
            Some(vl) => self.regs.read(vl),
            None => {
                // The block data path (the medium itself) is not part
                // of this core; plain-store reads come back empty.
                event!(
                    Level::TRACE,
                    "drum {}: read of non-V offset {:#x} returns 0",
                    self.id,
                    local
                );
                0
            }
        }
    }

    fn exchange_write(&mut self, ctx: &Context, local: u32, value: u64) {
        match VStoreAddress::from_local(local) {
            Some(vl) if vl.block == DRUM_VX_BLOCK => self.vx_write(ctx, vl.line, value),
            Some(vl) => self.regs.write(vl, value),
            None => {
                event!(
                    Level::TRACE,
                    "drum {}: write of {:#x} to non-V offset {:#x} discarded",
                    self.id,
                    value,
                    local
                );
            }
        }
    }

    fn advance_cycle(&mut self, ctx: &Context) -> Option<Interrupt> {
        self.step_rotation(ctx)
    }

    fn reset(&mut self) {
        self.regs.zeroise();
        self.position = 0;
        self.phase = TransferPhase::Idle;
        self.request = None;
        self.blocks_remaining = 0;
        // Attachment belongs to the hosting program, not to the
        // machine state, and survives a reset.
    }

    fn on_input_event(
        &mut self,
        ctx: &Context,
        input_event: InputEvent,
    ) -> Result<(), InputEventError> {
        match input_event {
            InputEvent::AttachDrumMedium => {
                event!(
                    Level::DEBUG,
                    "drum {}: medium attached at cycle {}",
                    self.id,
                    ctx.cycle
                );
                self.attached = true;
                Ok(())
            }
            InputEvent::DetachDrumMedium => {
                event!(
                    Level::DEBUG,
                    "drum {}: medium detached at cycle {}",
                    self.id,
                    ctx.cycle
                );
                self.attached = false;
                Ok(())
            }
        }
    }
}
