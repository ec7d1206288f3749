//! # Display Modes
//!
//! A [`DisplayMode`] bundles the CRTC, video controller, and PCG settings for
//! one screen mode. [`Display`] walks a caller-supplied list of them, always
//! reprogramming all three chips together:
//!
//! ```ignore
//! static MODES: [DisplayMode; 2] = [MODE_256X256, MODE_512X512];
//!
//! let mut display = Display::new(&MODES, &mut chipset).unwrap();
//! if pad.just_pressed(Button::B) {
//!     display.cycle(&mut chipset);
//! }
//! ```

use log::debug;

use crate::{
    chipset::Chipset,
    crtc::CrtcConfig,
    pcg::PcgConfig,
    port::RegisterPort,
    vidcon::VidconConfig,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DisplayMode {
    pub crtc: CrtcConfig,
    pub vidcon: VidconConfig,
    pub pcg: PcgConfig,
}

/// A list of modes and the one currently on screen.
#[derive(Debug)]
pub struct Display<'a> {
    modes: &'a [DisplayMode],
    current: usize,
}

impl<'a> Display<'a> {
    /// Apply `modes[0]`. Returns `None` if `modes` is empty.
    pub fn new<P: RegisterPort>(modes: &'a [DisplayMode], chipset: &mut Chipset<P>) -> Option<Self> {
        let first = modes.first()?;
        chipset.apply_mode(first);
        debug!("display: mode 0 of {}", modes.len());
        Some(Self { modes, current: 0 })
    }

    pub fn mode(&self) -> &DisplayMode {
        &self.modes[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn modes(&self) -> &'a [DisplayMode] {
        self.modes
    }

    /// Switch to the next mode, wrapping after the last.
    pub fn cycle<P: RegisterPort>(&mut self, chipset: &mut Chipset<P>) {
        self.current = (self.current + 1) % self.modes.len();
        chipset.apply_mode(&self.modes[self.current]);
        debug!("display: mode {} of {}", self.current, self.modes.len());
    }
}
