//! # CRT Controller
//!
//! The CRTC at `$E80000` generates display timing and owns the scroll
//! position of the text and graphic layers.
//!
//! ## Register Layout
//!
//! | Register | Address   | Contents                                        |
//! |----------|-----------|-------------------------------------------------|
//! | R00-R07  | `$E80000` | H/V total, sync end, display start/end          |
//! | R08      | `$E80010` | External sync horizontal phase fine adjustment  |
//! | R09      | `$E80012` | Raster number for the raster interrupt          |
//! | R10-R19  | `$E80014` | X/Y scroll for text, GP0, GP1, GP2, GP3         |
//! | R20      | `$E80028` | Memory mode / display mode flags (shadowed)     |
//! | R21      | `$E8002A` | Text access flags (shadowed, [`TextAccess`])    |
//! | R22      | `$E8002C` | Raster copy source / destination (shadowed)     |
//! | R23      | `$E8002E` | Text simultaneous-write mask pattern            |
//! | control  | `$E80481` | Control port (byte)                             |
//!
//! Only R20-R22 pack several settings into one word, so only those have
//! shadow copies. Their setters store the whole word on every call; there is
//! no commit step for the CRTC.
//!
//! ## R20
//!
//! ```text
//! 15                0
//! ...u gzcc ...f vvhh
//!    | ||||    | | \__ horizontal display:  00 = 256, 01 = 512, 11 = 768 dots
//!    | ||||    |  \___ vertical display:    00 = 256, 01 = 512, 10 = 1024i
//!    | ||||     \_____ horizontal freq:     0 = 15.98kHz, 1 = 31.5kHz
//!    | ||\\___________ color mode:          00 = 16, 01 = 256, 11 = 65536
//!    | | \____________ screen size:         0 = 512, 1 = 1024 dots
//!    |  \_____________ G-VRAM usage:        0 = display, 1 = buffer
//!     \_______________ T-VRAM usage:        0 = display, 1 = buffer
//! ```
//!
//! Screen size and color mode are duplicated in the video controller's R0
//! ([`Vidcon::set_screen_size`](crate::vidcon::Vidcon::set_screen_size)).
//! Keeping the two in agreement is up to the caller.

use core::ops::Range;

use log::debug;

use crate::{port::RegisterPort, shadow::Shadow};

pub const CRTC_BASE: u32 = 0xE80000;
pub const CRTC_CONTROL: u32 = 0xE80481;

/// Address of register `Rnn`.
#[inline(always)]
pub const fn reg(n: u32) -> u32 {
    CRTC_BASE + 2 * n
}

const R20_TVRAM_USAGE: usize = 12;
const R20_GVRAM_USAGE: usize = 11;
const R20_SCREEN_SIZE: usize = 10;
const R20_COLOR_MODE: Range<usize> = 8..10;
const R20_HFREQ: usize = 4;
const R20_HEIGHT: Range<usize> = 2..4;
const R20_WIDTH: Range<usize> = 0..2;

const R22_SOURCE: Range<usize> = 8..16;
const R22_DESTINATION: Range<usize> = 0..8;

/// 31kHz 512x512, 16 colors.
pub const R20_DEFAULT: u16 = 0x0015;
/// Simultaneous access off.
pub const R21_DEFAULT: u16 = 0x00FF;

bitflags::bitflags! {
    /// Text access flags in R21.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TextAccess: u16 {
        /// Apply the R23 mask pattern to text writes.
        const MASK         = 0x0200;
        /// Write to the selected text planes simultaneously.
        const SIMULTANEOUS = 0x0100;
        const AP3          = 0x0080;
        const AP2          = 0x0040;
        const AP1          = 0x0020;
        const AP0          = 0x0010;
        /// Raster copy target plane / G-VRAM clear target page.
        const CP3          = 0x0008;
        const CP2          = 0x0004;
        const CP1          = 0x0002;
        const CP0          = 0x0001;
    }
}

/// Layers with a scroll register pair in R10-R19.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrollLayer {
    Text,
    Gp0,
    Gp1,
    Gp2,
    Gp3,
}

impl ScrollLayer {
    pub const ALL: [ScrollLayer; 5] = [
        ScrollLayer::Text,
        ScrollLayer::Gp0,
        ScrollLayer::Gp1,
        ScrollLayer::Gp2,
        ScrollLayer::Gp3,
    ];

    const fn x_reg(&self) -> u32 {
        reg(10 + 2 * (*self as u32))
    }

    const fn y_reg(&self) -> u32 {
        self.x_reg() + 2
    }
}

/// Display timing for one screen mode.
///
/// Values from Inside X68000:
///
/// ```text
///     [       High-resolution       ] [   Low resolution    ]
///     768x512 512x512 512x256 256x256 512x512 512x256 256x256
/// R00     $89     $5B     $5B     $2D     $4B     $4B     $25
/// R01     $0E     $09     $09     $04     $03     $03     $01
/// R02     $1C     $11     $11     $06     $05     $05     $00
/// R03     $7C     $51     $51     $26     $45     $45     $20
/// R04    $237    $237    $237    $237    $103    $103    $103
/// R05     $05     $05     $05     $05     $02     $02     $02
/// R06     $28     $28     $28     $28     $10     $10     $10
/// R07    $228    $228    $228    $228    $100    $100    $100
/// R08     $1B     $1B     $1B     $1B     $2C     $2C     $24
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CrtcConfig {
    /// R00, 1 unit = 8 dots.
    pub htotal: u16,
    pub hsync_end: u16,
    pub hdisp_start: u16,
    pub hdisp_end: u16,
    /// R04, 1 unit = 1 line.
    pub vtotal: u16,
    pub vsync_end: u16,
    pub vdisp_start: u16,
    pub vdisp_end: u16,
    pub horiz_adjust: u16,
    /// R20. Bits 8-10 should match the video controller's R0.
    pub flags: u16,
}

/// Shadow state for the CRTC.
#[derive(Debug, Clone)]
pub struct Crtc {
    r20: Shadow,
    r21: Shadow,
    r22: Shadow,
}

impl Crtc {
    /// Shadows at their defaults. Hardware is not touched.
    pub const fn new() -> Self {
        Self {
            r20: Shadow::new(reg(20), R20_DEFAULT),
            r21: Shadow::new(reg(21), R21_DEFAULT),
            r22: Shadow::new(reg(22), 0),
        }
    }

    /// Zero every scroll register and reset the R20-R22 shadows.
    ///
    /// Display timing is left alone, and the new shadow values only reach
    /// hardware once one of their fields is set.
    pub fn init_default<P: RegisterPort>(&mut self, bus: &mut P) {
        self.reset_scroll(bus);
        *self = Self::new();
        debug!("crtc: default shadows, scroll reset");
    }

    /// Program R00-R08 and R20 from `config`. Scroll, R21-R23 and the
    /// control port are not touched.
    pub fn init<P: RegisterPort>(&mut self, bus: &mut P, config: &CrtcConfig) {
        let timing = [
            config.htotal,
            config.hsync_end,
            config.hdisp_start,
            config.hdisp_end,
            config.vtotal,
            config.vsync_end,
            config.vdisp_start,
            config.vdisp_end,
            config.horiz_adjust,
        ];
        for (n, value) in timing.into_iter().enumerate() {
            bus.write16(reg(n as u32), value);
        }
        self.r20.store(config.flags);
        self.r20.commit(bus);
        debug!("crtc: init, R20 = {:04X}", config.flags);
    }

    pub fn r20(&self) -> u16 {
        self.r20.value()
    }

    pub fn r21(&self) -> u16 {
        self.r21.value()
    }

    pub fn r22(&self) -> u16 {
        self.r22.value()
    }

    fn reset_scroll<P: RegisterPort>(&self, bus: &mut P) {
        for layer in ScrollLayer::ALL {
            bus.write16(layer.x_reg(), 0);
            bus.write16(layer.y_reg(), 0);
        }
    }

    // R00 - R09 ==============================================================

    #[inline(always)]
    pub fn set_htotal<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(0), v);
    }

    #[inline(always)]
    pub fn set_hsync_end<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(1), v);
    }

    #[inline(always)]
    pub fn set_hdisp_start<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(2), v);
    }

    #[inline(always)]
    pub fn set_hdisp_end<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(3), v);
    }

    #[inline(always)]
    pub fn set_vtotal<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(4), v);
    }

    #[inline(always)]
    pub fn set_vsync_end<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(5), v);
    }

    #[inline(always)]
    pub fn set_vdisp_start<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(6), v);
    }

    #[inline(always)]
    pub fn set_vdisp_end<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(7), v);
    }

    /// R08: external sync horizontal phase fine adjustment.
    #[inline(always)]
    pub fn set_horiz_adjust<P: RegisterPort>(&mut self, bus: &mut P, v: u16) {
        bus.write16(reg(8), v);
    }

    /// R09: raster number that raises the raster interrupt.
    #[inline(always)]
    pub fn set_raster_interrupt<P: RegisterPort>(&mut self, bus: &mut P, line: u16) {
        bus.write16(reg(9), line);
    }

    // R10 - R19 ==============================================================

    #[inline(always)]
    pub fn set_xscroll<P: RegisterPort>(&mut self, bus: &mut P, layer: ScrollLayer, x: u16) {
        bus.write16(layer.x_reg(), x);
    }

    #[inline(always)]
    pub fn set_yscroll<P: RegisterPort>(&mut self, bus: &mut P, layer: ScrollLayer, y: u16) {
        bus.write16(layer.y_reg(), y);
    }

    pub fn set_scroll<P: RegisterPort>(&mut self, bus: &mut P, layer: ScrollLayer, x: u16, y: u16) {
        self.set_xscroll(bus, layer, x);
        self.set_yscroll(bus, layer, y);
    }

    // R20 ====================================================================

    /// T-VRAM used for display (false) or as a buffer (true).
    pub fn set_tvram_usage<P: RegisterPort>(&mut self, bus: &mut P, buffer: bool) {
        self.r20.set_flag(R20_TVRAM_USAGE, buffer);
        self.r20.commit(bus);
    }

    /// G-VRAM used for display (false) or as a buffer (true).
    pub fn set_gvram_usage<P: RegisterPort>(&mut self, bus: &mut P, buffer: bool) {
        self.r20.set_flag(R20_GVRAM_USAGE, buffer);
        self.r20.commit(bus);
    }

    /// 512 dot (false) or 1024 dot (true) real screen.
    pub fn set_screen_size<P: RegisterPort>(&mut self, bus: &mut P, large: bool) {
        self.r20.set_flag(R20_SCREEN_SIZE, large);
        self.r20.commit(bus);
    }

    /// 16 (0), 256 (1) or 65536 (3) colors.
    pub fn set_color_mode<P: RegisterPort>(&mut self, bus: &mut P, mode: u8) {
        self.r20.set_field(R20_COLOR_MODE, mode as u16);
        self.r20.commit(bus);
    }

    /// 15.98kHz (false) or 31.5kHz (true).
    pub fn set_horizontal_freq<P: RegisterPort>(&mut self, bus: &mut P, high: bool) {
        self.r20.set_flag(R20_HFREQ, high);
        self.r20.commit(bus);
    }

    /// 256 (0), 512 (1), or 1024 interlaced (2, 31.5kHz only) lines.
    pub fn set_display_height<P: RegisterPort>(&mut self, bus: &mut P, height: u8) {
        self.r20.set_field(R20_HEIGHT, height as u16);
        self.r20.commit(bus);
    }

    /// 256 (0), 512 (1) or 768 (3) dots.
    pub fn set_display_width<P: RegisterPort>(&mut self, bus: &mut P, width: u8) {
        self.r20.set_field(R20_WIDTH, width as u16);
        self.r20.commit(bus);
    }

    // R21 ====================================================================

    pub fn set_text_access<P: RegisterPort>(&mut self, bus: &mut P, flags: TextAccess, on: bool) {
        let mut current = TextAccess::from_bits_retain(self.r21.value());
        current.set(flags, on);
        self.r21.store(current.bits());
        self.r21.commit(bus);
    }

    /// AP3-AP0 as one 4-bit field, AP0 in bit 0.
    pub fn set_access_planes<P: RegisterPort>(&mut self, bus: &mut P, planes: u8) {
        self.r21.set_field(4..8, planes as u16);
        self.r21.commit(bus);
    }

    /// CP3-CP0 as one 4-bit field, CP0 in bit 0.
    pub fn set_copy_planes<P: RegisterPort>(&mut self, bus: &mut P, planes: u8) {
        self.r21.set_field(0..4, planes as u16);
        self.r21.commit(bus);
    }

    // R22 - R23 ==============================================================

    /// Raster copy source raster.
    pub fn set_copy_source<P: RegisterPort>(&mut self, bus: &mut P, raster: u8) {
        self.r22.set_field(R22_SOURCE, raster as u16);
        self.r22.commit(bus);
    }

    /// Raster copy destination raster.
    pub fn set_copy_destination<P: RegisterPort>(&mut self, bus: &mut P, raster: u8) {
        self.r22.set_field(R22_DESTINATION, raster as u16);
        self.r22.commit(bus);
    }

    /// R23: mask applied to simultaneous text writes.
    #[inline(always)]
    pub fn set_text_mask_pattern<P: RegisterPort>(&mut self, bus: &mut P, pattern: u16) {
        bus.write16(reg(23), pattern);
    }

    #[inline(always)]
    pub fn set_control<P: RegisterPort>(&mut self, bus: &mut P, v: u8) {
        bus.write8(CRTC_CONTROL, v);
    }
}

impl Default for Crtc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{BusWrite, RegisterFile};

    const R20: u32 = 0xE80028;
    const R21: u32 = 0xE8002A;
    const R22: u32 = 0xE8002C;

    #[test]
    fn register_addresses() {
        assert_eq!(reg(0), 0xE80000);
        assert_eq!(reg(9), 0xE80012);
        assert_eq!(ScrollLayer::Text.x_reg(), 0xE80014);
        assert_eq!(ScrollLayer::Gp3.y_reg(), 0xE80026);
        assert_eq!(reg(20), R20);
        assert_eq!(reg(23), 0xE8002E);
    }

    #[test]
    fn init_default_only_touches_scroll() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();
        crtc.set_color_mode(&mut bus, 3);
        bus.clear_writes();

        crtc.init_default(&mut bus);

        assert_eq!(bus.write_count(), 10);
        assert!(bus.writes().all(|w| (0xE80014..=0xE80026).contains(&w.addr())));
        assert_eq!(crtc.r20(), R20_DEFAULT);
        assert_eq!(crtc.r21(), R21_DEFAULT);
        assert_eq!(crtc.r22(), 0);
        // the shadow reset is not committed
        assert_eq!(bus.peek16(R20), 0x0315);
    }

    #[test]
    fn r20_fields_are_isolated() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();

        crtc.set_color_mode(&mut bus, 3);
        assert_eq!(bus.peek16(R20), 0x0315);
        crtc.set_tvram_usage(&mut bus, true);
        crtc.set_gvram_usage(&mut bus, true);
        crtc.set_screen_size(&mut bus, true);
        assert_eq!(bus.peek16(R20), 0x1F15);

        crtc.set_display_width(&mut bus, 0);
        crtc.set_display_height(&mut bus, 2);
        crtc.set_horizontal_freq(&mut bus, false);
        assert_eq!(bus.peek16(R20), 0x1F08);

        crtc.set_color_mode(&mut bus, 0);
        assert_eq!(crtc.r20(), 0x1C08);
        assert_eq!(bus.peek16(R20), crtc.r20());
    }

    #[cfg(not(feature = "strict-fields"))]
    #[test]
    fn r20_fields_are_masked() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();
        crtc.set_display_width(&mut bus, 0xFF);
        assert_eq!(crtc.r20() & 0x0003, 0x0003);
        assert_eq!(crtc.r20() & !0x0003, R20_DEFAULT & !0x0003);
    }

    #[test]
    fn every_setter_call_stores_even_when_unchanged() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();
        crtc.set_horizontal_freq(&mut bus, true);
        crtc.set_horizontal_freq(&mut bus, true);
        assert_eq!(bus.writes_to(R20).count(), 2);
    }

    #[test]
    fn r21_flags_and_planes() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();

        crtc.set_text_access(&mut bus, TextAccess::all(), false);
        assert_eq!(bus.peek16(R21), 0);
        crtc.set_text_access(&mut bus, TextAccess::MASK | TextAccess::CP1, true);
        assert_eq!(bus.peek16(R21), 0x0202);
        crtc.set_access_planes(&mut bus, 0b1010);
        assert_eq!(bus.peek16(R21), 0x02A2);
        crtc.set_copy_planes(&mut bus, 0b0101);
        assert_eq!(bus.peek16(R21), 0x02A5);
        crtc.set_text_access(&mut bus, TextAccess::AP3, false);
        assert_eq!(bus.peek16(R21), 0x0225);
    }

    #[test]
    fn r22_is_a_byte_pair() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();
        crtc.set_copy_source(&mut bus, 0x12);
        crtc.set_copy_destination(&mut bus, 0x34);
        assert_eq!(bus.peek16(R22), 0x1234);
        crtc.set_copy_source(&mut bus, 0xAB);
        assert_eq!(bus.peek16(R22), 0xAB34);
    }

    #[test]
    fn init_programs_timing_and_keeps_scroll() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();
        crtc.set_xscroll(&mut bus, ScrollLayer::Gp1, 77);
        let config = CrtcConfig {
            htotal: 0x5B,
            hsync_end: 0x09,
            hdisp_start: 0x11,
            hdisp_end: 0x51,
            vtotal: 0x237,
            vsync_end: 0x05,
            vdisp_start: 0x28,
            vdisp_end: 0x228,
            horiz_adjust: 0x1B,
            flags: 0x0015,
        };

        crtc.init(&mut bus, &config);

        let expected: [u16; 9] = [0x5B, 0x09, 0x11, 0x51, 0x237, 0x05, 0x28, 0x228, 0x1B];
        for (n, value) in expected.into_iter().enumerate() {
            assert_eq!(bus.peek16(reg(n as u32)), value, "R{:02}", n);
        }
        assert_eq!(bus.peek16(R20), 0x0015);
        assert_eq!(crtc.r20(), 0x0015);
        assert_eq!(bus.peek16(0xE8001C), 77);
        assert_eq!(bus.writes_to(R21).count(), 0);
        // only the caller's own scroll write
        assert_eq!(bus.writes_to(0xE8001C).count(), 1);
        assert_eq!(bus.writes_to(reg(10)).count(), 0);
    }

    #[test]
    fn control_port_is_a_byte() {
        let mut bus = RegisterFile::new();
        let mut crtc = Crtc::new();
        crtc.set_control(&mut bus, 0x08);
        assert_eq!(bus.last_write(), Some(&BusWrite::Byte { addr: 0xE80481, value: 0x08 }));
    }
}
