//! Bit layouts of the fixed-head disc (drum) V-store lines.
//!
//! A transfer request is described by a single packed word written to
//! the disc-address line:
//!
//! | R/W     | disc     | band    | block   | size    |
//! | ------- | -------- | ------- | ------- | ------- |
//! | 30      | 29-20    | 19-14   | 13-8    | 6-0     |
//! | (1 bit) | (10 bit) | (6 bit) | (6 bit) | (7 bit) |
//!
//! Only the two low bits of the disc field are backed by flip-flops
//! (the controller drives at most four discs) and bit 31 is tied
//! high, so a read of the line always shows 0x8 in the top nibble.
//! Writes wider than 32 bits arrive over the 64-bit V-store highway
//! and are truncated before packing.
use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

/// Bits of the disc-address line which are backed by storage.
pub const DISC_ADDRESS_WRITE_MASK: u32 = 0x403F_FF7F;
/// Bits of the disc-address line which are tied high.
pub const DISC_ADDRESS_FIXED_ONES: u32 = 0x8000_0000;

/// Writable (and clear-on-write-one) bits of the disc-status line.
pub const DISC_STATUS_WRITE_MASK: u32 = 0x7FFF_DBCF;
/// The unit-number echo field of the disc-status line.  The field is
/// backed by storage but its read path is tied to unit 0, so these
/// bits always read as zero.
pub const DISC_STATUS_UNIT_FIELD: u32 = 0x0000_000F;
/// Set together with [`DISC_STATUS_DECODE`] when a request fails
/// validation.
pub const DISC_STATUS_ILLEGAL_REQUEST: u32 = 0x0000_0040;
/// The decode bit.  Set together with the illegal-request bit;
/// cleared, like it, only by writing a 1 back to it.
pub const DISC_STATUS_DECODE: u32 = 0x0000_0080;

/// The store-address and complete-address lines hold a real-store
/// word offset of at most 28 bits.
pub const STORE_ADDRESS_MASK: u32 = 0x0FFF_FFFF;

/// Width of one unit's field in the current-positions line.  Unit
/// *n*'s angular position sits at bit offset `6 * n`.
pub const POSITION_FIELD_WIDTH: u32 = 6;

pub const fn position_field_shift(unit: u8) -> u32 {
    POSITION_FIELD_WIDTH * unit as u32
}

/// Direction of a requested transfer, decoded from the R/W bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TransferDirection {
    /// Drum to store.
    Read,
    /// Store to drum.
    Write,
}

/// The packed disc-address word, as stored (truncated, masked, and
/// with the tied-high bit present).
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscAddress(u32);

impl DiscAddress {
    /// Pack an incoming V-store write into stored form.
    pub const fn pack(bits: u64) -> DiscAddress {
        DiscAddress((bits as u32 & DISC_ADDRESS_WRITE_MASK) | DISC_ADDRESS_FIXED_ONES)
    }

    /// Reconstitute a previously stored value.
    pub const fn from_stored(word: u32) -> DiscAddress {
        DiscAddress(word)
    }

    pub const fn as_word(&self) -> u32 {
        self.0
    }

    pub const fn direction(&self) -> TransferDirection {
        if self.0 & (1 << 30) != 0 {
            TransferDirection::Read
        } else {
            TransferDirection::Write
        }
    }

    /// The disc select field (two flip-flop-backed bits).
    pub const fn disc(&self) -> u8 {
        ((self.0 >> 20) & 0x3) as u8
    }

    pub const fn band(&self) -> u8 {
        ((self.0 >> 14) & 0x3F) as u8
    }

    /// Starting block within the band.
    pub const fn block(&self) -> u32 {
        (self.0 >> 8) & 0x3F
    }

    /// Transfer length in blocks.
    pub const fn size(&self) -> u32 {
        self.0 & 0x7F
    }
}

impl Debug for DiscAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("DiscAddress")
            .field("direction", &self.direction())
            .field("disc", &self.disc())
            .field("band", &self.band())
            .field("block", &self.block())
            .field("size", &self.size())
            .finish()
    }
}

impl Display for DiscAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{:?} disc {} band {} block {} size {}",
            self.direction(),
            self.disc(),
            self.band(),
            self.block(),
            self.size()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_pack_truncates_and_ties_top_bit() {
        // Regression taken from the hardware commissioning checks:
        // the 64-bit probe pattern loses its high word, the unbacked
        // disc and size bits, and gains the tied-high bit.
        let packed = DiscAddress::pack(0xFFFF_FFFF_A5A5_A5A5);
        assert_eq!(packed.as_word(), 0x8025_A525);
    }

    #[test]
    fn test_field_extraction() {
        let packed = DiscAddress::pack(0x8025_A525);
        assert_eq!(packed.direction(), TransferDirection::Write);
        assert_eq!(packed.disc(), 2);
        assert_eq!(packed.band(), 0x16);
        assert_eq!(packed.block(), 0x25);
        assert_eq!(packed.size(), 0x25);
    }

    #[test]
    fn test_direction_bit() {
        let packed = DiscAddress::pack(1 << 30);
        assert_eq!(packed.direction(), TransferDirection::Read);
    }

    #[proptest]
    fn prop_top_nibble_always_reads_8(bits: u64) {
        let packed = DiscAddress::pack(bits);
        assert_eq!(packed.as_word() >> 28, 0x8);
    }

    #[proptest]
    fn prop_fields_cover_only_backed_bits(bits: u64) {
        let packed = DiscAddress::pack(bits);
        let direction_bit = match packed.direction() {
            TransferDirection::Read => 1u32 << 30,
            TransferDirection::Write => 0,
        };
        let rebuilt = DISC_ADDRESS_FIXED_ONES
            | direction_bit
            | u32::from(packed.disc()) << 20
            | u32::from(packed.band()) << 14
            | packed.block() << 8
            | packed.size();
        assert_eq!(rebuilt, packed.as_word());
    }

    #[proptest]
    fn prop_pack_is_idempotent(bits: u64) {
        let once = DiscAddress::pack(bits);
        let twice = DiscAddress::pack(u64::from(once.as_word()));
        assert_eq!(once, twice);
    }
}
