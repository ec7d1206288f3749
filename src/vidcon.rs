//! # Video Controller
//!
//! The video controller mixes the graphic planes, text, and PCG layers and
//! holds the three palettes.
//!
//! ## Register Layout
//!
//! | Address   | Name   | Description                                      |
//! |-----------|--------|--------------------------------------------------|
//! | `$E82000` | GP pal | Graphic plane palette, 256 words                 |
//! | `$E82200` | TX pal | Text palette, 16 words                           |
//! | `$E82200` | SP pal | PCG palette, 256 words (block 0 is the text pal) |
//! | `$E82400` | R0     | Screen: color mode, real screen size             |
//! | `$E82500` | R1     | Layer priorities                                 |
//! | `$E82600` | R2     | Enables and translucency ([`VidconFlags`])       |
//!
//! ## Shadows and Commit
//!
//! Unlike the CRTC, none of the setters here touch hardware. They edit the
//! three shadow words, and [`Vidcon::commit`] writes R0, R1, R2 in that order.
//! Call it after a batch of changes, usually during vblank:
//!
//! ```ignore
//! chipset.vidcon.set_prio_sprites(0);
//! chipset.vidcon.set_prio_text(1);
//! chipset.vidcon.set_flags(VidconFlags::BORDER, true);
//! x68k::vbl::wait_for_vblank(&mut chipset.bus);
//! chipset.vidcon.commit(&mut chipset.bus);
//! ```
//!
//! Palette writes are not shadowed; they go straight to the palette RAM.
//!
//! ## R1 Priorities
//!
//! ```text
//! 15 -------------- 0
//! ..SS .... .... .... sprite (PCG) priority
//! .... TT.. .... .... text priority
//! .... ..GG .... .... graphics priority
//! .... .... 33.. ....  --> GP3 priority
//! .... .... ..22 ....  --> GP2 priority
//! .... .... .... 11..  --> GP1 priority
//! .... .... .... ..00  --> GP0 priority
//! ```
//!
//! 0 is topmost.

use core::ops::Range;

use log::{debug, trace};

use crate::{port::RegisterPort, shadow::Shadow};

pub const GP_PALETTE: u32 = 0xE82000;
pub const TEXT_PALETTE: u32 = 0xE82200;
pub const PCG_PALETTE: u32 = 0xE82200;

pub const VIDCON_R0: u32 = 0xE82400;
pub const VIDCON_R1: u32 = 0xE82500;
pub const VIDCON_R2: u32 = 0xE82600;

const R0_SCREEN_SIZE: usize = 2;
const R0_COLOR_MODE: Range<usize> = 0..2;

const R1_SPRITES: Range<usize> = 12..14;
const R1_TEXT: Range<usize> = 10..12;
const R1_GRAPHICS: Range<usize> = 8..10;

/// 512x512, 16 colors.
pub const R0_DEFAULT: u16 = 0x0000;
/// Sprites > Text > GP0 > GP1 > GP2 > GP3.
pub const R1_DEFAULT: u16 = 0x06E4;

bitflags::bitflags! {
    /// R2 at `$E82600`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct VidconFlags: u16 {
        /// Don't display the image, even when superimposing.
        const VIDEO_CUT = 0x8000;
        /// Force text palette 0 translucent regardless of EXON.
        const AH        = 0x4000;
        /// Translucent video image (color image unit).
        const VHT       = 0x2000;
        /// Enable special priority / translucent mode.
        const EXON      = 0x1000;
        /// Special priority (0) or translucent (1).
        const HP        = 0x0800;
        /// Sharp reserved (0) or other (1).
        const BP        = 0x0400;
        /// Translucent graphic screen.
        const GG        = 0x0200;
        /// Translucent text/sprite screen.
        const GT        = 0x0100;
        const BORDER    = 0x0080;
        const SPRITES   = 0x0040;
        const TEXT      = 0x0020;
        const GRAPHICS  = 0x0010;
        const GP3       = 0x0008;
        const GP2       = 0x0004;
        const GP1       = 0x0002;
        const GP0       = 0x0001;
    }
}

/// All graphic layers, text and sprites on.
pub const R2_DEFAULT: VidconFlags = VidconFlags::from_bits_retain(0x007F);

/// Video controller settings for one screen mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VidconConfig {
    /// R0. Bits 0-2 should match CRTC R20 bits 8-10.
    pub screen: u16,
    /// R1.
    pub prio: u16,
    /// R2.
    pub flags: VidconFlags,
}

/// Shadow state for the video controller's R0-R2.
#[derive(Debug, Clone)]
pub struct Vidcon {
    screen: Shadow,
    prio: Shadow,
    flags: Shadow,
}

impl Vidcon {
    pub const fn new() -> Self {
        Self {
            screen: Shadow::new(VIDCON_R0, R0_DEFAULT),
            prio: Shadow::new(VIDCON_R1, R1_DEFAULT),
            flags: Shadow::new(VIDCON_R2, R2_DEFAULT.bits()),
        }
    }

    /// Reset the shadows to 512x512 16-color, sprites > text > GP0-3, all
    /// layers on. Nothing is written until [`commit`](Self::commit).
    pub fn init_default(&mut self) {
        *self = Self::new();
        debug!("vidcon: default shadows");
    }

    /// Load `config` into the shadows and commit.
    pub fn init<P: RegisterPort>(&mut self, bus: &mut P, config: &VidconConfig) {
        self.screen.store(config.screen);
        self.prio.store(config.prio);
        self.flags.store(config.flags.bits());
        self.commit(bus);
        debug!("vidcon: init");
    }

    /// Write R0, R1, R2 to hardware, in that order.
    pub fn commit<P: RegisterPort>(&self, bus: &mut P) {
        self.screen.commit(bus);
        self.prio.commit(bus);
        self.flags.commit(bus);
        trace!(
            "vidcon: commit {:04X} {:04X} {:04X}",
            self.screen.value(),
            self.prio.value(),
            self.flags.value()
        );
    }

    pub fn screen(&self) -> u16 {
        self.screen.value()
    }

    pub fn prio(&self) -> u16 {
        self.prio.value()
    }

    pub fn flags(&self) -> VidconFlags {
        VidconFlags::from_bits_retain(self.flags.value())
    }

    // Palettes ===============================================================

    #[inline(always)]
    pub fn set_gp_color<P: RegisterPort>(&mut self, bus: &mut P, index: u8, color: u16) {
        bus.write16(GP_PALETTE + 2 * index as u32, color);
    }

    /// Text palette has 16 entries. Higher indices run on into the PCG
    /// palette blocks.
    #[inline(always)]
    pub fn set_text_color<P: RegisterPort>(&mut self, bus: &mut P, index: u8, color: u16) {
        bus.write16(TEXT_PALETTE + 2 * index as u32, color);
    }

    /// PCG palette: 16 blocks of 16 colors. Block 0 is shared with text.
    #[inline(always)]
    pub fn set_pcg_color<P: RegisterPort>(&mut self, bus: &mut P, index: u8, color: u16) {
        bus.write16(PCG_PALETTE + 2 * index as u32, color);
    }

    // R0 =====================================================================

    /// 512 dot (false) or 1024 dot (true) real screen.
    pub fn set_screen_size(&mut self, large: bool) {
        self.screen.set_flag(R0_SCREEN_SIZE, large);
    }

    /// 16 (0), 256 (1) or 65536 (3) colors.
    pub fn set_color_mode(&mut self, mode: u8) {
        self.screen.set_field(R0_COLOR_MODE, mode as u16);
    }

    // R1 =====================================================================

    pub fn set_prio_sprites(&mut self, prio: u8) {
        self.prio.set_field(R1_SPRITES, prio as u16);
    }

    pub fn set_prio_text(&mut self, prio: u8) {
        self.prio.set_field(R1_TEXT, prio as u16);
    }

    pub fn set_prio_graphics(&mut self, prio: u8) {
        self.prio.set_field(R1_GRAPHICS, prio as u16);
    }

    /// Priority of graphic plane `plane` (0-3) within the graphics group.
    pub fn set_prio_gp(&mut self, plane: u8, prio: u8) {
        let lo = 2 * (plane & 3) as usize;
        self.prio.set_field(lo..lo + 2, prio as u16);
    }

    // R2 =====================================================================

    pub fn set_flags(&mut self, flags: VidconFlags, on: bool) {
        let mut current = self.flags();
        current.set(flags, on);
        self.flags.store(current.bits());
    }

    pub fn set_video_cut(&mut self, on: bool) {
        self.set_flags(VidconFlags::VIDEO_CUT, on);
    }

    pub fn set_ah(&mut self, on: bool) {
        self.set_flags(VidconFlags::AH, on);
    }

    pub fn set_vht(&mut self, on: bool) {
        self.set_flags(VidconFlags::VHT, on);
    }

    pub fn set_exon(&mut self, on: bool) {
        self.set_flags(VidconFlags::EXON, on);
    }

    /// Special priority (false) or translucent mode (true).
    pub fn set_hp(&mut self, translucent: bool) {
        self.set_flags(VidconFlags::HP, translucent);
    }

    pub fn set_bp(&mut self, on: bool) {
        self.set_flags(VidconFlags::BP, on);
    }

    pub fn set_gg(&mut self, on: bool) {
        self.set_flags(VidconFlags::GG, on);
    }

    pub fn set_gt(&mut self, on: bool) {
        self.set_flags(VidconFlags::GT, on);
    }

    pub fn set_border_enable(&mut self, on: bool) {
        self.set_flags(VidconFlags::BORDER, on);
    }

    pub fn set_sprite_enable(&mut self, on: bool) {
        self.set_flags(VidconFlags::SPRITES, on);
    }

    pub fn set_text_enable(&mut self, on: bool) {
        self.set_flags(VidconFlags::TEXT, on);
    }

    pub fn set_graphic_enable(&mut self, on: bool) {
        self.set_flags(VidconFlags::GRAPHICS, on);
    }

    /// Enable graphic plane `plane` (0-3).
    pub fn set_gp_enable(&mut self, plane: u8, on: bool) {
        let bit = VidconFlags::from_bits_retain(1 << (plane & 3));
        self.set_flags(bit, on);
    }
}

impl Default for Vidcon {
    fn default() -> Self {
        Self::new()
    }
}

/// Palette word from 5-bit components.
///
/// ```text
/// 15 -------------- 0
/// GGGG GRRR RRBB BBB.
/// ```
pub const fn rgb5(r: u8, g: u8, b: u8) -> u16 {
    (((r & 0x1F) as u16) << 6) | (((g & 0x1F) as u16) << 11) | (((b & 0x1F) as u16) << 1)
}

/// Palette word from 4-bit components.
pub const fn rgb4(r: u8, g: u8, b: u8) -> u16 {
    rgb5(r << 1, g << 1, b << 1)
}

/// Palette word from 8-bit components; the low 3 bits are dropped.
pub const fn rgb8(r: u8, g: u8, b: u8) -> u16 {
    rgb5(r >> 3, g >> 3, b >> 3)
}
