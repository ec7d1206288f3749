//! # PCG (Sprite/BG Controller)
//!
//! The PCG draws 128 hardware sprites and two 64x64 tile background layers.
//!
//! ## Register Layout
//!
//! | Address   | Name     | Description                                  |
//! |-----------|----------|----------------------------------------------|
//! | `$EB0000` | SPRITES  | 128 sprite records ([`sprites`])             |
//! | `$EB0800` | BG0 X/Y  | BG0 scroll, 10 bits each                     |
//! | `$EB0804` | BG1 X/Y  | BG1 scroll, 10 bits each                     |
//! | `$EB0808` | CONTROL  | Display and BG enables, nametable selects    |
//! | `$EB080A` | H-TOTAL  | 8 bits                                       |
//! | `$EB080C` | H-DISP   | 6 bits                                       |
//! | `$EB080E` | V-DISP   | 8 bits                                       |
//! | `$EB0810` | MODE     | L/H, V-res, H-res                            |
//! | `$EBC000` | BG0 NT   | 64x64 tile words                             |
//! | `$EBE000` | BG1 NT   | 64x64 tile words                             |
//!
//! CONTROL and MODE are shadowed, and every setter writes the full word back
//! immediately.
//!
//! ```text
//! CONTROL                      MODE
//! 15 -------------- 0          15 -------------- 0
//! .... ..D. ..11 3220          .... .... ...L VVHH
//!        |    |  | ||                       |  |  |
//!        |    |  | |BG0 on                  |  |  H-res
//!        |    |  | BG0 nametable            |  V-res
//!        |    |  BG1 on                     L/H
//!        |    BG1 nametable
//!        display enable
//! ```
//!
//! [`Pcg::init`] turns the display off before touching the timing words and
//! back on once the sprite table is cleared.

pub mod sprites;

use core::ops::Range;

use log::debug;

use crate::{port::RegisterPort, shadow::{Shadow, mask}};

pub use sprites::{SPRITE_SLOTS, SpriteBuffer, SpritePriority};

pub const PCG_BG0_X: u32 = 0xEB0800;
pub const PCG_BG0_Y: u32 = 0xEB0802;
pub const PCG_BG1_X: u32 = 0xEB0804;
pub const PCG_BG1_Y: u32 = 0xEB0806;
pub const PCG_CONTROL: u32 = 0xEB0808;
pub const PCG_HTOTAL: u32 = 0xEB080A;
pub const PCG_HDISP: u32 = 0xEB080C;
pub const PCG_VDISP: u32 = 0xEB080E;
pub const PCG_MODE: u32 = 0xEB0810;
pub const PCG_BG0_NAMETABLE: u32 = 0xEBC000;
pub const PCG_BG1_NAMETABLE: u32 = 0xEBE000;

const CTRL_DISPLAY: usize = 9;
const CTRL_BG1_TXSEL: Range<usize> = 4..6;
const CTRL_BG1_ON: usize = 3;
const CTRL_BG0_TXSEL: Range<usize> = 1..3;
const CTRL_BG0_ON: usize = 0;

const MODE_LH: usize = 4;
const MODE_VRES: Range<usize> = 2..4;
const MODE_HRES: Range<usize> = 0..2;

/// Tile attribute word, used for both nametable entries and sprites.
///
/// ```text
/// 15 -------------- 0
/// YX.. CCCC PPPP PPPP
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TileAttr(pub u16);

impl TileAttr {
    pub const fn new(pattern: u8, color: u8, xflip: bool, yflip: bool) -> Self {
        TileAttr(
            ((yflip as u16) << 15)
                | ((xflip as u16) << 14)
                | (((color & 0xF) as u16) << 8)
                | pattern as u16,
        )
    }

    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BgLayer {
    Bg0,
    Bg1,
}

impl BgLayer {
    const fn scroll_regs(self) -> (u32, u32) {
        match self {
            BgLayer::Bg0 => (PCG_BG0_X, PCG_BG0_Y),
            BgLayer::Bg1 => (PCG_BG1_X, PCG_BG1_Y),
        }
    }

    const fn nametable(self) -> u32 {
        match self {
            BgLayer::Bg0 => PCG_BG0_NAMETABLE,
            BgLayer::Bg1 => PCG_BG1_NAMETABLE,
        }
    }
}

/// Timing and mode words for one screen mode. Written as-is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PcgConfig {
    pub htotal: u16,
    pub hdisp: u16,
    pub vdisp: u16,
    /// MODE register.
    pub flags: u16,
}

#[derive(Debug, Clone)]
pub struct Pcg {
    ctrl: Shadow,
    mode: Shadow,
    sprites: SpriteBuffer,
}

impl Pcg {
    pub const fn new() -> Self {
        Self {
            ctrl: Shadow::new(PCG_CONTROL, 0),
            mode: Shadow::new(PCG_MODE, 0),
            sprites: SpriteBuffer::new(),
        }
    }

    /// 256x256 display with both backgrounds on, BG0 on nametable 0, BG1
    /// on nametable 1, and every sprite hidden.
    pub fn init_default<P: RegisterPort>(&mut self, bus: &mut P) {
        self.ctrl.store(0);
        self.ctrl.commit(bus);
        self.mode.store(0);
        self.mode.commit(bus);

        self.set_display_enable(bus, false);
        self.set_bg1_txsel(bus, 1);
        self.set_bg0_txsel(bus, 0);
        self.set_bg_scroll(bus, BgLayer::Bg0, 0, 0);
        self.set_bg_scroll(bus, BgLayer::Bg1, 0, 0);
        self.set_bg0_enable(bus, true);
        self.set_bg1_enable(bus, true);

        self.set_lh(bus, true);
        self.set_vres(bus, 0);
        self.set_hres(bus, 1);

        self.clear_sprites(bus);
        self.set_display_enable(bus, true);
        debug!("pcg: default init");
    }

    /// Program timing and mode from `config`, then bring the display up with
    /// both BG layers on and no sprites.
    pub fn init<P: RegisterPort>(&mut self, bus: &mut P, config: &PcgConfig) {
        bus.write16(PCG_HTOTAL, config.htotal);
        bus.write16(PCG_HDISP, config.hdisp);
        bus.write16(PCG_VDISP, config.vdisp);
        self.mode.store(config.flags);
        self.mode.commit(bus);

        self.set_display_enable(bus, false);
        self.set_bg0_txsel(bus, 0);
        self.set_bg1_txsel(bus, 1);
        self.set_bg0_enable(bus, true);
        self.set_bg1_enable(bus, true);
        self.set_bg_scroll(bus, BgLayer::Bg0, 0, 0);
        self.set_bg_scroll(bus, BgLayer::Bg1, 0, 0);
        self.clear_sprites(bus);
        self.set_display_enable(bus, true);
        debug!("pcg: init, mode {:04X}", config.flags);
    }

    pub fn ctrl(&self) -> u16 {
        self.ctrl.value()
    }

    pub fn mode(&self) -> u16 {
        self.mode.value()
    }

    pub fn sprites(&self) -> &SpriteBuffer {
        &self.sprites
    }

    // Timing =================================================================

    pub fn set_htotal<P: RegisterPort>(&mut self, bus: &mut P, value: u16) {
        bus.write16(PCG_HTOTAL, mask(value, 8));
    }

    pub fn set_hdisp<P: RegisterPort>(&mut self, bus: &mut P, value: u16) {
        bus.write16(PCG_HDISP, mask(value, 6));
    }

    pub fn set_vdisp<P: RegisterPort>(&mut self, bus: &mut P, value: u16) {
        bus.write16(PCG_VDISP, mask(value, 8));
    }

    // MODE ===================================================================

    /// MODE bit 4, documented only as "L/H".
    pub fn set_lh<P: RegisterPort>(&mut self, bus: &mut P, on: bool) {
        self.mode.set_flag(MODE_LH, on);
        self.mode.commit(bus);
    }

    pub fn set_vres<P: RegisterPort>(&mut self, bus: &mut P, value: u8) {
        self.mode.set_field(MODE_VRES, value as u16);
        self.mode.commit(bus);
    }

    pub fn set_hres<P: RegisterPort>(&mut self, bus: &mut P, value: u8) {
        self.mode.set_field(MODE_HRES, value as u16);
        self.mode.commit(bus);
    }

    // CONTROL ================================================================

    pub fn set_display_enable<P: RegisterPort>(&mut self, bus: &mut P, on: bool) {
        self.ctrl.set_flag(CTRL_DISPLAY, on);
        self.ctrl.commit(bus);
    }

    /// Nametable used by BG1 (0 = `$EBC000`, 1 = `$EBE000`).
    pub fn set_bg1_txsel<P: RegisterPort>(&mut self, bus: &mut P, table: u8) {
        self.ctrl.set_field(CTRL_BG1_TXSEL, table as u16);
        self.ctrl.commit(bus);
    }

    pub fn set_bg1_enable<P: RegisterPort>(&mut self, bus: &mut P, on: bool) {
        self.ctrl.set_flag(CTRL_BG1_ON, on);
        self.ctrl.commit(bus);
    }

    /// Nametable used by BG0.
    pub fn set_bg0_txsel<P: RegisterPort>(&mut self, bus: &mut P, table: u8) {
        self.ctrl.set_field(CTRL_BG0_TXSEL, table as u16);
        self.ctrl.commit(bus);
    }

    pub fn set_bg0_enable<P: RegisterPort>(&mut self, bus: &mut P, on: bool) {
        self.ctrl.set_flag(CTRL_BG0_ON, on);
        self.ctrl.commit(bus);
    }

    // Backgrounds ============================================================

    pub fn set_bg_scroll<P: RegisterPort>(&mut self, bus: &mut P, layer: BgLayer, x: u16, y: u16) {
        let (xr, yr) = layer.scroll_regs();
        bus.write16(xr, mask(x, 10));
        bus.write16(yr, mask(y, 10));
    }

    /// Write one tile of `layer`'s nametable. Coordinates wrap at 64.
    #[inline(always)]
    pub fn set_tile<P: RegisterPort>(&mut self, bus: &mut P, layer: BgLayer, x: u8, y: u8, attr: TileAttr) {
        let index = (x & 63) as u32 + (((y & 63) as u32) << 6);
        bus.write16(layer.nametable() + 2 * index, attr.bits());
    }

    // Sprites ================================================================

    /// Write slot `index` directly, bypassing the frame buffer.
    pub fn set_sprite<P: RegisterPort>(
        &mut self,
        bus: &mut P,
        index: u8,
        x: i16,
        y: i16,
        attr: TileAttr,
        prio: SpritePriority,
    ) {
        sprites::write_slot(bus, index, x, y, attr, prio);
    }

    /// Hide all 128 sprites and reset the frame buffer.
    pub fn clear_sprites<P: RegisterPort>(&mut self, bus: &mut P) {
        for i in 0..SPRITE_SLOTS {
            sprites::hide_slot(bus, i);
        }
        self.sprites.reset();
    }

    /// Queue a sprite for this frame. Extra sprites past 128 are dropped.
    #[inline]
    pub fn add_sprite<P: RegisterPort>(
        &mut self,
        bus: &mut P,
        x: i16,
        y: i16,
        attr: TileAttr,
        prio: SpritePriority,
    ) {
        self.sprites.add(bus, x, y, attr, prio);
    }

    /// End the frame: hides leftovers and readies the buffer for the next one.
    #[inline]
    pub fn finish_sprites<P: RegisterPort>(&mut self, bus: &mut P) {
        self.sprites.finish(bus);
    }
}

impl Default for Pcg {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{BusWrite, RegisterFile};

    #[test]
    fn tile_attr_packing() {
        assert_eq!(TileAttr::new(0x12, 0x3, true, false).bits(), 0x4312);
        assert_eq!(TileAttr::new(0xFF, 0xFF, true, true).bits(), 0xCFFF);
        assert_eq!(TileAttr::new(0, 0, false, false), TileAttr::default());
    }

    #[test]
    fn init_default_brings_display_up_last() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        pcg.init_default(&mut bus);

        assert_eq!(pcg.ctrl(), 0x0219);
        assert_eq!(pcg.mode(), 0x0011);
        assert_eq!(bus.peek16(PCG_CONTROL), 0x0219);
        assert_eq!(bus.peek16(PCG_MODE), 0x0011);
        for addr in [PCG_BG0_X, PCG_BG0_Y, PCG_BG1_X, PCG_BG1_Y] {
            assert_eq!(bus.writes_to(addr).count(), 1);
        }
        for i in 0..SPRITE_SLOTS {
            assert_eq!(bus.peek16(sprites::slot_addr(i) + 6), 0);
        }

        let ctrl: heapless::Vec<u16, 16> = bus
            .writes_to(PCG_CONTROL)
            .filter_map(|w| match *w {
                BusWrite::Word { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(ctrl.first(), Some(&0));
        assert_eq!(ctrl.last(), Some(&0x0219));
        assert!(ctrl[..ctrl.len() - 1].iter().all(|v| v & 0x0200 == 0));
        assert_eq!(bus.last_write(), Some(&BusWrite::Word { addr: PCG_CONTROL, value: 0x0219 }));
    }

    #[test]
    fn init_writes_timing_then_mode() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        let config = PcgConfig { htotal: 0xFF, hdisp: 0x15, vdisp: 0x28, flags: 0x0015 };
        pcg.init(&mut bus, &config);

        let head: heapless::Vec<BusWrite, 4> = bus.writes().take(4).copied().collect();
        assert_eq!(
            head.as_slice(),
            &[
                BusWrite::Word { addr: PCG_HTOTAL, value: 0xFF },
                BusWrite::Word { addr: PCG_HDISP, value: 0x15 },
                BusWrite::Word { addr: PCG_VDISP, value: 0x28 },
                BusWrite::Word { addr: PCG_MODE, value: 0x0015 },
            ]
        );
        assert_eq!(pcg.mode(), 0x0015);
        assert_eq!(bus.peek16(PCG_CONTROL), 0x0219);
        assert_eq!(pcg.sprites().next(), 0);
        assert_eq!(pcg.sprites().previous(), 0);
    }

    #[test]
    fn txsel_fields_are_isolated() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        pcg.set_bg1_txsel(&mut bus, 1);
        pcg.set_bg0_txsel(&mut bus, 3);
        assert_eq!(pcg.ctrl(), 0x0016);
        pcg.set_bg0_txsel(&mut bus, 0);
        assert_eq!(pcg.ctrl(), 0x0010);
        pcg.set_bg1_enable(&mut bus, true);
        pcg.set_bg0_enable(&mut bus, true);
        assert_eq!(bus.peek16(PCG_CONTROL), 0x0019);
    }

    #[test]
    fn mode_fields_are_isolated() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        pcg.set_hres(&mut bus, 3);
        assert_eq!(pcg.mode(), 0x03);
        pcg.set_vres(&mut bus, 2);
        assert_eq!(pcg.mode(), 0x0B);
        pcg.set_lh(&mut bus, true);
        assert_eq!(pcg.mode(), 0x1B);
        pcg.set_hres(&mut bus, 0);
        assert_eq!(pcg.mode(), 0x18);
        pcg.set_lh(&mut bus, false);
        assert_eq!(pcg.mode(), 0x08);
        assert_eq!(bus.peek16(PCG_MODE), 0x08);
        assert_eq!(bus.writes_to(PCG_MODE).count(), 5);
    }

    #[test]
    fn every_control_setter_writes() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        pcg.set_display_enable(&mut bus, false);
        pcg.set_display_enable(&mut bus, false);
        pcg.set_hres(&mut bus, 0);
        assert_eq!(bus.write_count(), 3);
    }

    #[cfg(not(feature = "strict-fields"))]
    #[test]
    fn timing_and_scroll_are_masked() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        pcg.set_hdisp(&mut bus, 0xFF);
        pcg.set_htotal(&mut bus, 0x1FF);
        pcg.set_bg_scroll(&mut bus, BgLayer::Bg1, 0x0401, 0xFFFF);
        pcg.set_vres(&mut bus, 7);
        assert_eq!(bus.peek16(PCG_HDISP), 0x3F);
        assert_eq!(bus.peek16(PCG_HTOTAL), 0xFF);
        assert_eq!(bus.peek16(PCG_BG1_X), 0x001);
        assert_eq!(bus.peek16(PCG_BG1_Y), 0x3FF);
        assert_eq!(pcg.mode(), 0x000C);
    }

    #[test]
    fn tiles_land_in_their_nametable() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        let attr = TileAttr::new(5, 1, false, false);
        pcg.set_tile(&mut bus, BgLayer::Bg1, 3, 2, attr);
        assert_eq!(bus.last_write(), Some(&BusWrite::Word { addr: 0xEBE106, value: 0x0105 }));
        pcg.set_tile(&mut bus, BgLayer::Bg0, 64 + 1, 63, attr);
        assert_eq!(bus.last_write(), Some(&BusWrite::Word { addr: 0xEBDF82, value: 0x0105 }));
    }

    #[test]
    fn whole_nametable_is_kept() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        let attr = TileAttr::new(5, 1, false, false);
        for y in 0..64 {
            for x in 0..64 {
                pcg.set_tile(&mut bus, BgLayer::Bg0, x, y, attr);
                pcg.set_tile(&mut bus, BgLayer::Bg1, x, y, TileAttr(x as u16));
            }
        }
        assert_eq!(bus.peek16(PCG_BG0_NAMETABLE), 0x0105);
        assert_eq!(bus.peek16(PCG_BG0_NAMETABLE + 2 * 4095), 0x0105);
        assert_eq!(bus.peek16(PCG_BG1_NAMETABLE + 2 * 4095), 63);
    }

    #[test]
    fn clear_sprites_resets_buffer() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        let attr = TileAttr::new(1, 0, false, false);
        pcg.add_sprite(&mut bus, 0, 0, attr, SpritePriority::AboveBoth);
        pcg.finish_sprites(&mut bus);
        pcg.add_sprite(&mut bus, 0, 0, attr, SpritePriority::AboveBoth);
        pcg.clear_sprites(&mut bus);

        assert_eq!(pcg.sprites(), &SpriteBuffer::new());
        assert_eq!(bus.peek16(0xEB0006), 0);
    }

    #[test]
    fn set_sprite_bypasses_frame_buffer() {
        let mut bus = RegisterFile::new();
        let mut pcg = Pcg::new();
        pcg.set_sprite(&mut bus, 10, -16, 0, TileAttr(0x0123), SpritePriority::BetweenLayers);
        assert_eq!(bus.peek16(0xEB0050), 0);
        assert_eq!(bus.peek16(0xEB0052), 16);
        assert_eq!(bus.peek16(0xEB0054), 0x0123);
        assert_eq!(bus.peek16(0xEB0056), 2);
        assert_eq!(pcg.sprites().next(), 0);
    }
}
