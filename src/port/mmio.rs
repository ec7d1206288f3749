use volatile_register::RW;

use crate::port::RegisterPort;

/// Volatile access to the real X68000 bus.
///
/// Many of the video registers are write-only; reading them back returns
/// whatever the bus floats to. That's why the subsystems keep shadow copies
/// instead of doing read-modify-write through this port.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Only sound on an X68000 (or an emulator mapping the same I/O space),
    /// and only once: every `Mmio` aliases the whole register space.
    pub unsafe fn new() -> Mmio {
        Mmio { _private: () }
    }

    #[inline(always)]
    fn byte(addr: u32) -> &'static RW<u8> {
        unsafe { &*(addr as usize as *const RW<u8>) }
    }

    #[inline(always)]
    fn word(addr: u32) -> &'static RW<u16> {
        unsafe { &*(addr as usize as *const RW<u16>) }
    }
}

impl RegisterPort for Mmio {
    #[inline(always)]
    fn read8(&mut self, addr: u32) -> u8 {
        Self::byte(addr).read()
    }

    #[inline(always)]
    fn read16(&mut self, addr: u32) -> u16 {
        Self::word(addr).read()
    }

    #[inline(always)]
    fn write8(&mut self, addr: u32, value: u8) {
        unsafe { Self::byte(addr).write(value) }
    }

    #[inline(always)]
    fn write16(&mut self, addr: u32, value: u16) {
        unsafe { Self::word(addr).write(value) }
    }
}
