use log::debug;

use crate::{
    crtc::Crtc,
    display::DisplayMode,
    input::Joypad,
    pcg::Pcg,
    port::{Mmio, RegisterPort},
    vidcon::Vidcon,
};

/// The video chips and the bus they sit on.
///
/// Fields are public so the shadow groups and the bus can be borrowed
/// separately: `chipset.pcg.set_bg0_enable(&mut chipset.bus, true)`.
pub struct Chipset<P> {
    pub bus: P,
    pub crtc: Crtc,
    pub vidcon: Vidcon,
    pub pcg: Pcg,
}

impl Chipset<Mmio> {
    /// # Safety
    ///
    /// See [`Mmio::new`]. Call once, on the real machine.
    pub unsafe fn mmio() -> Self {
        Self::new(unsafe { Mmio::new() })
    }
}

impl<P: RegisterPort> Chipset<P> {
    /// Wrap `bus` with fresh shadows. Nothing is written.
    pub const fn new(bus: P) -> Self {
        Self {
            bus,
            crtc: Crtc::new(),
            vidcon: Vidcon::new(),
            pcg: Pcg::new(),
        }
    }

    /// Default state for all three chips, leaving the display timing the
    /// boot ROM set up.
    pub fn init_default(&mut self) {
        self.crtc.init_default(&mut self.bus);
        self.vidcon.init_default();
        self.vidcon.commit(&mut self.bus);
        self.pcg.init_default(&mut self.bus);
    }

    /// Program CRTC, video controller and PCG from `mode`, in that order.
    pub fn apply_mode(&mut self, mode: &DisplayMode) {
        self.crtc.init(&mut self.bus, &mode.crtc);
        self.vidcon.init(&mut self.bus, &mode.vidcon);
        self.pcg.init(&mut self.bus, &mode.pcg);
        debug!("chipset: mode applied, R20 = {:04X}", mode.crtc.flags);
    }

    pub fn joypads(&self) -> (Joypad<0>, Joypad<1>) {
        (Joypad::new(), Joypad::new())
    }
}
