//! Generic emulation of a unit's V-store: the memory-mapped register
//! file through which software controls a peripheral.
//!
//! Every line of a V-store behaves like a little piece of hardware
//! rather than a RAM word: some bits are backed by flip-flops, some
//! are tied off, some clear themselves when software writes a 1 back
//! to them.  A [`Line`] describes those behaviours declaratively and
//! a [`RegisterFile`] maps `(block, line)` addresses onto them, so
//! that each unit only has to state *what* its registers do, not
//! re-implement *how*.
//!
//! Addresses with no line behind them are inert, exactly like an
//! unwired backplane position: reads return 0 and writes disappear.
//! Neither is an error.
use std::collections::BTreeMap;

use tracing::{event, Level};

use base::prelude::*;

/// How a line combines an incoming write with its stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteRule {
    /// Ordinary read-modify-write under the write mask.
    Masked,
    /// Writing 1s clears exactly those bits; 0s leave them alone.
    /// Used by status lines whose flags software acknowledges by
    /// writing them back.
    ClearOnWriteOnes,
}

/// One V-store line.
pub struct Line {
    value: u64,
    write_mask: u64,
    fixed_ones: u64,
    rule: WriteRule,
    read_transform: Option<fn(u64) -> u64>,
}

impl Line {
    /// A line whose bits under `write_mask` accept ordinary writes.
    /// A mask of 0 makes the line read-only; such writes are
    /// absorbed, mirroring a tied-off hardware input.
    pub fn masked(write_mask: u64) -> Line {
        Line {
            value: 0,
            write_mask,
            fixed_ones: 0,
            rule: WriteRule::Masked,
            read_transform: None,
        }
    }

    /// A read-only line (`write_mask = 0`).
    pub fn read_only() -> Line {
        Line::masked(0)
    }

    /// A status line with clear-on-write-1 semantics for the bits
    /// under `write_mask`.
    pub fn clear_on_write_ones(write_mask: u64) -> Line {
        Line {
            value: 0,
            write_mask,
            fixed_ones: 0,
            rule: WriteRule::ClearOnWriteOnes,
            read_transform: None,
        }
    }

    /// Declare bits which are tied high: they read as 1 and no write
    /// can disturb them.
    pub fn with_fixed_ones(mut self, bits: u64) -> Line {
        assert_eq!(
            bits & self.write_mask,
            0,
            "tied-high bits {bits:#x} overlap the write mask {:#x}",
            self.write_mask
        );
        self.fixed_ones = bits;
        self.value |= bits;
        self
    }

    /// Install a transform applied to the stored value on every read,
    /// for lines which expose fewer (or different) bits than they
    /// store.
    pub fn with_read_transform(mut self, transform: fn(u64) -> u64) -> Line {
        self.read_transform = Some(transform);
        self
    }

    fn read(&self) -> u64 {
        match self.read_transform {
            Some(transform) => transform(self.value),
            None => self.value,
        }
    }

    fn write(&mut self, bits: u64) {
        self.value = match self.rule {
            WriteRule::Masked => {
                (self.value & !self.write_mask) | (bits & self.write_mask) | self.fixed_ones
            }
            WriteRule::ClearOnWriteOnes => self.value & !(bits & self.write_mask),
        };
    }
}

/// A unit's register file: the mapping from V-store line addresses to
/// [`Line`]s.
#[derive(Default)]
pub struct RegisterFile {
    lines: BTreeMap<VStoreAddress, Line>,
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile {
            lines: BTreeMap::new(),
        }
    }

    /// Add a line.  Defining the same address twice is a
    /// configuration bug in the unit, not a runtime condition, and
    /// fails hard.
    pub fn define(&mut self, vline: VStoreAddress, line: Line) {
        let previous = self.lines.insert(vline, line);
        assert!(previous.is_none(), "V-store line {vline} defined twice");
    }

    /// Read a line.  Unmapped addresses read as 0.
    pub fn read(&self, vline: VStoreAddress) -> u64 {
        match self.lines.get(&vline) {
            Some(line) => line.read(),
            None => {
                event!(Level::TRACE, "read of unmapped V-store line {}", vline);
                0
            }
        }
    }

    /// Write a line.  Unmapped addresses absorb the write.
    pub fn write(&mut self, vline: VStoreAddress, bits: u64) {
        match self.lines.get_mut(&vline) {
            Some(line) => line.write(bits),
            None => {
                event!(
                    Level::TRACE,
                    "write of {:#x} to unmapped V-store line {} discarded",
                    bits,
                    vline
                );
            }
        }
    }

    /// Engineering access: store a value directly, bypassing the
    /// line's write behaviour.  For unit-internal updates (a unit may
    /// set bits software can only clear) and for tests.
    pub fn set(&mut self, vline: VStoreAddress, value: u64) {
        match self.lines.get_mut(&vline) {
            Some(line) => line.value = value | line.fixed_ones,
            None => panic!("engineering access to undefined V-store line {vline}"),
        }
    }

    /// Engineering access: the stored value, without the line's read
    /// transform.
    pub fn get(&self, vline: VStoreAddress) -> u64 {
        match self.lines.get(&vline) {
            Some(line) => line.value,
            None => panic!("engineering access to undefined V-store line {vline}"),
        }
    }

    /// Return every line to its power-on value.  Tied-high bits stay
    /// high; everything else clears.
    pub fn zeroise(&mut self) {
        for line in self.lines.values_mut() {
            line.value = line.fixed_ones;
        }
    }
}

#[cfg(test)]
fn addr(block: u8, line: u8) -> VStoreAddress {
    VStoreAddress::new(block, line)
}

#[test]
fn test_masked_write_only_touches_masked_bits() {
    let mut regs = RegisterFile::new();
    regs.define(addr(0, 1), Line::masked(0x0000_FFFF));
    regs.write(addr(0, 1), 0xABCD_1234);
    assert_eq!(regs.read(addr(0, 1)), 0x0000_1234);
    // Bits outside the mask survive an ordinary write once set by
    // engineering access.
    regs.set(addr(0, 1), 0x5555_0000);
    regs.write(addr(0, 1), 0xFFFF_FFFF);
    assert_eq!(regs.read(addr(0, 1)), 0x5555_FFFF);
}

#[test]
fn test_clear_on_write_ones_clears_exactly_the_written_bits() {
    let mut regs = RegisterFile::new();
    regs.define(addr(0, 2), Line::clear_on_write_ones(0xFF));
    regs.set(addr(0, 2), 0xF0);
    regs.write(addr(0, 2), 0x30);
    assert_eq!(regs.read(addr(0, 2)), 0xC0);
    // Writing zeros changes nothing.
    regs.write(addr(0, 2), 0x00);
    assert_eq!(regs.read(addr(0, 2)), 0xC0);
}

#[test]
fn test_clear_on_write_ones_respects_write_mask() {
    let mut regs = RegisterFile::new();
    regs.define(addr(0, 2), Line::clear_on_write_ones(0x0F));
    regs.set(addr(0, 2), 0xFF);
    regs.write(addr(0, 2), 0xFF);
    assert_eq!(regs.read(addr(0, 2)), 0xF0);
}

#[test]
fn test_unmapped_lines_are_inert() {
    let mut regs = RegisterFile::new();
    assert_eq!(regs.read(addr(3, 9)), 0);
    regs.write(addr(3, 9), 0xFFFF_FFFF); // discarded, not an error
    assert_eq!(regs.read(addr(3, 9)), 0);
}

#[test]
fn test_read_only_line_absorbs_writes() {
    let mut regs = RegisterFile::new();
    regs.define(addr(0, 3), Line::read_only());
    regs.set(addr(0, 3), 0x2A);
    regs.write(addr(0, 3), 0xFFFF_FFFF);
    assert_eq!(regs.read(addr(0, 3)), 0x2A);
}

#[test]
fn test_fixed_ones_survive_writes_and_zeroise() {
    let mut regs = RegisterFile::new();
    regs.define(
        addr(0, 0),
        Line::masked(0x0FFF_FFFF).with_fixed_ones(0x8000_0000),
    );
    assert_eq!(regs.read(addr(0, 0)), 0x8000_0000);
    regs.write(addr(0, 0), 0x0123_4567);
    assert_eq!(regs.read(addr(0, 0)), 0x8123_4567);
    regs.write(addr(0, 0), 0);
    assert_eq!(regs.read(addr(0, 0)), 0x8000_0000);
    regs.zeroise();
    assert_eq!(regs.read(addr(0, 0)), 0x8000_0000);
}

#[test]
fn test_read_transform_changes_only_the_view() {
    let mut regs = RegisterFile::new();
    regs.define(
        addr(0, 4),
        Line::masked(0xFFFF_FFFF).with_read_transform(|v| v & !0xF),
    );
    regs.write(addr(0, 4), 0xA5A5A5);
    assert_eq!(regs.read(addr(0, 4)), 0xA5A5A0);
    assert_eq!(regs.get(addr(0, 4)), 0xA5A5A5);
}

#[test]
#[should_panic(expected = "defined twice")]
fn test_duplicate_definition_fails_hard() {
    let mut regs = RegisterFile::new();
    regs.define(addr(0, 0), Line::read_only());
    regs.define(addr(0, 0), Line::read_only());
}
