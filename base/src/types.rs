//! Addressing types shared by the whole simulator.
//!
//! The MU5 Exchange routes *real* addresses: addresses which have
//! already been through the processor's name-store/CPR translation,
//! so no virtual addressing scheme appears anywhere in this crate.
//! A real address is carried in a 32-bit word laid out as
//!
//! | unit    | V-flag | offset   |
//! | ------- | ------ | -------- |
//! | 27-24   | 23     | 22-0     |
//! | (4 bit) | (1 bit)| (23 bit) |
//!
//! The unit field selects the Exchange port which owns the address.
//! When the V-flag is set, the offset does not name a store word at
//! all but a line of the owning unit's V-store: block in bits 10-8,
//! line in bits 7-0.
use std::fmt::{self, Debug, Display, Formatter, LowerHex};

use serde::Serialize;

/// A fully-resolved address as presented to the Exchange.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RealAddress(u32);

impl RealAddress {
    /// Bits of the unit field.
    pub const UNIT_FIELD: u32 = 0x0F00_0000;
    /// The V-store flag bit.
    pub const V_FLAG: u32 = 0x0080_0000;
    /// Bits of the offset field proper (V-flag excluded).
    pub const OFFSET_FIELD: u32 = 0x007F_FFFF;
    /// Everything the owning unit sees: V-flag plus offset.
    pub const LOCAL_FIELD: u32 = 0x00FF_FFFF;

    /// Form a real address from a raw 32-bit word.  Bits above the
    /// unit field are not part of the address and are dropped.
    pub const fn from_word(word: u32) -> RealAddress {
        RealAddress(word & (Self::UNIT_FIELD | Self::LOCAL_FIELD))
    }

    /// Form a real address from a unit number and the 24-bit local
    /// part (V-flag plus offset).
    pub fn new(unit_id: u8, local: u32) -> RealAddress {
        assert!(unit_id < 16, "exchange unit number {unit_id} does not fit the unit field");
        assert_eq!(
            local & !Self::LOCAL_FIELD,
            0,
            "local part {local:#x} does not fit below the unit field"
        );
        RealAddress(u32::from(unit_id) << 24 | local)
    }

    /// Form the real address of a V-store line of the given unit.
    pub fn vstore(unit_id: u8, vline: VStoreAddress) -> RealAddress {
        RealAddress::new(unit_id, vline.to_local())
    }

    pub const fn unit_id(&self) -> u8 {
        ((self.0 & Self::UNIT_FIELD) >> 24) as u8
    }

    pub const fn is_vstore(&self) -> bool {
        self.0 & Self::V_FLAG != 0
    }

    /// The 24-bit part forwarded to the owning unit (V-flag included;
    /// the Exchange itself never decodes the V-flag).
    pub const fn local(&self) -> u32 {
        self.0 & Self::LOCAL_FIELD
    }

    pub const fn as_word(&self) -> u32 {
        self.0
    }
}

impl Debug for RealAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "RealAddress({:#010x})", self.0)
    }
}

impl Display for RealAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:#010x}", self.0)
    }
}

impl LowerHex for RealAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        LowerHex::fmt(&self.0, f)
    }
}

/// The address of one V-store line: a block (0-7) and a line within
/// the block (0-255).  This is the peripheral-facing view; the
/// Exchange-facing [`RealAddress`] for a line is formed by the unit's
/// own resolver (see `RealAddress::vstore`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VStoreAddress {
    pub block: u8,
    pub line: u8,
}

impl VStoreAddress {
    pub fn new(block: u8, line: u8) -> VStoreAddress {
        assert!(block < 8, "V-store block {block} does not fit the 3-bit block field");
        VStoreAddress { block, line }
    }

    /// Decode the local part of a real address.  Returns `None` when
    /// the V-flag is clear, i.e. the address names ordinary store.
    pub const fn from_local(local: u32) -> Option<VStoreAddress> {
        if local & RealAddress::V_FLAG == 0 {
            None
        } else {
            Some(VStoreAddress {
                block: ((local >> 8) & 0x7) as u8,
                line: (local & 0xFF) as u8,
            })
        }
    }

    pub const fn to_local(self) -> u32 {
        RealAddress::V_FLAG | (self.block as u32) << 8 | self.line as u32
    }
}

impl Display for VStoreAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "V{}.{}", self.block, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_real_address_fields() {
        let ra = RealAddress::from_word(0x8425_A5A5);
        assert_eq!(ra.as_word(), 0x0425_A5A5);
        assert_eq!(ra.unit_id(), 4);
        assert!(!ra.is_vstore());
        assert_eq!(ra.local(), 0x25_A5A5);
    }

    #[test]
    fn test_vstore_address_round_trip() {
        let vline = VStoreAddress::new(4, 3);
        let ra = RealAddress::vstore(6, vline);
        assert_eq!(ra.unit_id(), 6);
        assert!(ra.is_vstore());
        assert_eq!(VStoreAddress::from_local(ra.local()), Some(vline));
    }

    #[test]
    fn test_from_local_requires_v_flag() {
        assert_eq!(VStoreAddress::from_local(0x0403), None);
        assert_eq!(
            VStoreAddress::from_local(RealAddress::V_FLAG | 0x0403),
            Some(VStoreAddress::new(4, 3))
        );
    }

    #[proptest]
    fn prop_unit_and_local_partition_the_word(word: u32) {
        let ra = RealAddress::from_word(word);
        assert_eq!(
            ra.as_word(),
            u32::from(ra.unit_id()) << 24 | ra.local()
        );
        assert!(ra.unit_id() < 16);
        assert_eq!(ra.local() & !RealAddress::LOCAL_FIELD, 0);
    }

    #[proptest]
    fn prop_vstore_local_round_trips(#[strategy(0u8..8)] block: u8, line: u8) {
        let vline = VStoreAddress::new(block, line);
        assert_eq!(VStoreAddress::from_local(vline.to_local()), Some(vline));
    }
}
