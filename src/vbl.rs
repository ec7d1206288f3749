//! Frame pacing off the MFP's general purpose input lines.
//!
//! The CRTC's VDISP and VSYNC outputs are wired to the MFP GPIP, whose data
//! register sits at `$E88000`. These waits poll it with no timeout.

use core::hint::spin_loop;

use crate::port::RegisterPort;

pub const MFP_GPDR: u32 = 0xE88000;

bitflags::bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Gpip: u16 {
        const ALARM  = 1 << 0;
        const EXPON  = 1 << 1;
        const POWSW  = 1 << 2;
        const OPMIRQ = 1 << 3;
        /// Set while the CRTC is in the active display area.
        const VDISP  = 1 << 4;
        const VSYNC  = 1 << 6;
        const HSYNC  = 1 << 7;
    }
}

#[inline(always)]
pub fn gpip<P: RegisterPort>(bus: &mut P) -> Gpip {
    Gpip::from_bits_retain(bus.read16(MFP_GPDR))
}

/// Wait for the start of the next vertical sync pulse.
pub fn wait_for_vsync<P: RegisterPort>(bus: &mut P) {
    while gpip(bus).contains(Gpip::VSYNC) {
        spin_loop();
    }
    while !gpip(bus).contains(Gpip::VSYNC) {
        spin_loop();
    }
}

/// Wait until the beam leaves the display area.
pub fn wait_for_vblank<P: RegisterPort>(bus: &mut P) {
    while gpip(bus).contains(Gpip::VDISP) {
        spin_loop();
    }
}

/// Wait until the beam enters the display area.
pub fn wait_for_vdisp<P: RegisterPort>(bus: &mut P) {
    while !gpip(bus).contains(Gpip::VDISP) {
        spin_loop();
    }
}
