use bit_field::BitField;

use crate::port::RegisterPort;

pub const JOY_BASE: u32 = 0xE9A001;

#[derive(Debug, Copy, Clone)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
}

impl Button {
    const fn idx(&self) -> usize {
        match self {
            Button::Up => 0,
            Button::Down => 1,
            Button::Left => 2,
            Button::Right => 3,
            Button::A => 4,
            Button::B => 5,
        }
    }
}

/// Joystick on port `PORT` (0 or 1).
///
/// The port lines are active-low; `buttons` holds them inverted so a pressed
/// button reads as 1.
///
/// ```ignore
/// let mut pad = Joypad::<0>::new();
/// loop {
///     pad.read(&mut bus);
///     if pad.just_pressed(Button::A) {
///         fire();
///     }
/// }
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Joypad<const PORT: u8> {
    pub buttons: u8,
    pub buttons_last: u8,
}

impl<const PORT: u8> Joypad<PORT> {
    const ADDR: u32 = JOY_BASE + 2 * (PORT & 1) as u32;

    pub const fn new() -> Self {
        Self {
            buttons: 0,
            buttons_last: 0,
        }
    }

    #[inline(always)]
    pub fn read<P: RegisterPort>(&mut self, bus: &mut P) {
        self.buttons_last = self.buttons;
        self.buttons = !bus.read8(Self::ADDR) & 0b0011_1111;
    }

    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.get_bit(button.idx())
    }

    #[inline]
    pub fn was_pressed(&self, button: Button) -> bool {
        self.buttons_last.get_bit(button.idx())
    }

    /// True only on the read where the button went down.
    #[inline]
    pub fn just_pressed(&self, button: Button) -> bool {
        self.is_pressed(button) && !self.was_pressed(button)
    }

    /// True only on the read where the button came up.
    #[inline]
    pub fn just_released(&self, button: Button) -> bool {
        !self.is_pressed(button) && self.was_pressed(button)
    }
}
