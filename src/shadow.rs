//! # Shadow Registers
//!
//! A [`Shadow`] is one 16-bit hardware word mirrored in RAM, paired with the
//! address it belongs to. Setters edit one field of the mirror and then either
//! store the whole word straight away ([`Shadow::commit`] after every change)
//! or leave it for a later group commit.
//!
//! Field values wider than their field are masked, never rejected. With the
//! `strict-fields` feature a debug build asserts instead.

use core::ops::Range;

use bit_field::BitField;

use crate::port::RegisterPort;

/// Keep the low `width` bits of `value`.
#[inline(always)]
pub(crate) fn mask(value: u16, width: usize) -> u16 {
    #[cfg(feature = "strict-fields")]
    debug_assert!(
        width >= 16 || value >> width == 0,
        "{:#X} does not fit in a {}-bit field",
        value,
        width
    );
    if width >= 16 { value } else { value & ((1 << width) - 1) }
}

/// RAM copy of one write-only register word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Shadow {
    addr: u32,
    value: u16,
}

impl Shadow {
    pub(crate) const fn new(addr: u32, value: u16) -> Self {
        Self { addr, value }
    }

    #[inline(always)]
    pub(crate) const fn value(&self) -> u16 {
        self.value
    }

    /// Replace the bits in `bits` with `value`, masked to fit.
    #[inline(always)]
    pub(crate) fn set_field(&mut self, bits: Range<usize>, value: u16) {
        let width = bits.end - bits.start;
        self.value.set_bits(bits, mask(value, width));
    }

    #[inline(always)]
    pub(crate) fn set_flag(&mut self, bit: usize, on: bool) {
        self.value.set_bit(bit, on);
    }

    #[inline(always)]
    pub(crate) fn store(&mut self, value: u16) {
        self.value = value;
    }

    /// Write the mirror to its hardware address.
    #[inline(always)]
    pub(crate) fn commit<P: RegisterPort>(&self, bus: &mut P) {
        bus.write16(self.addr, self.value);
    }
}
