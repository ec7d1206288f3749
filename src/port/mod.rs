//! # Register Ports
//!
//! Every register access in this crate goes through a [`RegisterPort`].
//! On hardware that's [`Mmio`], which does volatile loads and stores at the
//! real bus addresses. Off hardware it's [`RegisterFile`], a small simulated
//! register file that remembers what was written and in which order.
//!
//! ```ignore
//! // On the machine
//! let bus = unsafe { Mmio::new() };
//! let mut chipset = Chipset::new(bus);
//!
//! // In a test
//! let mut chipset = Chipset::new(RegisterFile::new());
//! chipset.vidcon.set_prio_text(1);
//! chipset.vidcon.commit(&mut chipset.bus);
//! assert_eq!(chipset.bus.peek16(0xE82500) & 0x0C00, 0x0400);
//! ```
//!
//! Addresses are 68000 bus addresses. The bus is big-endian, so a byte at an
//! odd address is the low half of the word at the even address below it.

pub mod mmio;
pub mod register_file;

pub use mmio::Mmio;
pub use register_file::{BusWrite, RegisterFile};

/// Byte and word access to memory-mapped registers.
///
/// Reads take `&mut self` because reading some ports has side effects on
/// real hardware.
pub trait RegisterPort {
    fn read8(&mut self, addr: u32) -> u8;
    fn read16(&mut self, addr: u32) -> u16;
    fn write8(&mut self, addr: u32, value: u8);
    fn write16(&mut self, addr: u32, value: u16);
}

impl<P: RegisterPort + ?Sized> RegisterPort for &mut P {
    #[inline(always)]
    fn read8(&mut self, addr: u32) -> u8 {
        (**self).read8(addr)
    }

    #[inline(always)]
    fn read16(&mut self, addr: u32) -> u16 {
        (**self).read16(addr)
    }

    #[inline(always)]
    fn write8(&mut self, addr: u32, value: u8) {
        (**self).write8(addr, value)
    }

    #[inline(always)]
    fn write16(&mut self, addr: u32, value: u16) {
        (**self).write16(addr, value)
    }
}
