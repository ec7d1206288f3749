//! # Sprite Table
//!
//! The PCG reads 128 sprite records from `$EB0000`, 8 bytes each:
//!
//! ```text
//! +0  X position   (10 bits, screen X + 16)
//! +2  Y position   (10 bits, screen Y + 16)
//! +4  attribute    (see TileAttr)
//! +6  priority     (PRW, ---- ---- ---- -210)
//! ```
//!
//! [`SpriteBuffer`] lets a frame emit any number of sprites without clearing
//! the whole table. It remembers how many slots the previous frame used and
//! hides those the first time the new frame adds a sprite, so slots the new
//! frame doesn't reach stay hidden.
//!
//! ```ignore
//! loop {
//!     for e in entities.iter() {
//!         chipset.pcg.add_sprite(&mut chipset.bus, e.x, e.y, e.attr, SpritePriority::AboveBoth);
//!     }
//!     chipset.pcg.finish_sprites(&mut chipset.bus);
//!     x68k::vbl::wait_for_vsync(&mut chipset.bus);
//! }
//! ```

use log::trace;

use crate::{pcg::TileAttr, port::RegisterPort};

pub const SPRITE_TABLE: u32 = 0xEB0000;
pub const SPRITE_SLOTS: u8 = 128;

/// Sprite positions are offset by 16 so sprites can slide in from the
/// top-left edge.
pub const SPRITE_OFFSET: i16 = 16;

/// Low two bits of the priority word.
///
/// The word is documented as three bits wide (`-210`), but only bits 0-1
/// have a known meaning. Bit 2 is always written as 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpritePriority {
    /// Not drawn.
    Hidden = 0,
    /// Behind BG0 and BG1.
    BehindBoth = 1,
    /// Between BG0 and BG1.
    BetweenLayers = 2,
    /// In front of both backgrounds.
    AboveBoth = 3,
}

impl SpritePriority {
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

#[inline(always)]
pub(crate) const fn slot_addr(index: u8) -> u32 {
    SPRITE_TABLE + 8 * (index & 0x7F) as u32
}

#[inline(always)]
fn position(v: i16) -> u16 {
    v.wrapping_add(SPRITE_OFFSET) as u16 & 0x3FF
}

/// Write all four words of sprite slot `index` (masked to 0-127).
pub(crate) fn write_slot<P: RegisterPort>(
    bus: &mut P,
    index: u8,
    x: i16,
    y: i16,
    attr: TileAttr,
    prio: SpritePriority,
) {
    let addr = slot_addr(index);
    bus.write16(addr, position(x));
    bus.write16(addr + 2, position(y));
    bus.write16(addr + 4, attr.bits());
    bus.write16(addr + 6, prio.bits());
}

/// Zero the priority word of slot `index`. The other words are left as is.
#[inline(always)]
pub(crate) fn hide_slot<P: RegisterPort>(bus: &mut P, index: u8) {
    bus.write16(slot_addr(index) + 6, SpritePriority::Hidden.bits());
}

/// Frame counters for the sprite table.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SpriteBuffer {
    next: u8,
    previous: u8,
}

impl SpriteBuffer {
    pub const fn new() -> Self {
        Self { next: 0, previous: 0 }
    }

    /// Forget both frames. Use after the table was cleared some other way.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Sprites written so far this frame.
    pub fn next(&self) -> u8 {
        self.next
    }

    /// Slots from the previous frame that are still waiting to be hidden.
    pub fn previous(&self) -> u8 {
        self.previous
    }

    pub(crate) fn add<P: RegisterPort>(
        &mut self,
        bus: &mut P,
        x: i16,
        y: i16,
        attr: TileAttr,
        prio: SpritePriority,
    ) {
        self.hide_stale(bus);

        if self.next >= SPRITE_SLOTS {
            trace!("sprites: table full, dropping sprite at ({}, {})", x, y);
            return;
        }

        write_slot(bus, self.next, x, y, attr, prio);
        self.next += 1;
    }

    pub(crate) fn finish<P: RegisterPort>(&mut self, bus: &mut P) {
        self.hide_stale(bus);
        self.previous = self.next;
        self.next = 0;
    }

    fn hide_stale<P: RegisterPort>(&mut self, bus: &mut P) {
        while self.previous > 0 {
            self.previous -= 1;
            hide_slot(bus, self.previous);
        }
    }
}
