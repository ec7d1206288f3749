//! # OPM (YM2151)
//!
//! The FM sound chip sits behind two byte ports. A register write is a
//! register number to `$E90001` followed by the value to `$E90003`, and the
//! chip must not be busy before either byte:
//!
//! ```ignore
//! opm::set_pan_fl_con(&mut bus, 0, OpmPan::BOTH, 7, 4);
//! opm::set_tl(&mut bus, 0, 3, 0);
//! opm::set_oct_note(&mut bus, 0, 4, OpmNote::A);
//! opm::set_key_on(&mut bus, 0, 0xF);
//! ```
//!
//! Reading `$E90003` returns the status byte instead of the data.
//!
//! Channels are 0-7 and operators 0-3. Field values are masked to their
//! documented width. Registers whose bit meaning is uncertain (test mode,
//! LFO reset) are written as raw values.

use core::hint::spin_loop;

use log::trace;

use crate::{port::RegisterPort, shadow::mask};

pub const OPM_BASE: u32 = 0xE90000;
pub const OPM_ADDRESS: u32 = OPM_BASE + 1;
pub const OPM_DATA: u32 = OPM_BASE + 3;
pub const OPM_STATUS: u32 = OPM_BASE + 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum OpmReg {
    TestMode = 0x01,
    KeyOn = 0x08,
    Noise = 0x0F,
    ClkAUpper = 0x10,
    ClkALower = 0x11,
    ClkB = 0x12,
    TimerFlags = 0x14,
    LfoFreq = 0x18,
    LfoDepth = 0x19,
    Control = 0x1B,
    // One per channel.
    PanFlCon = 0x20,
    OctNote = 0x28,
    Kf = 0x30,
    PmsAms = 0x38,
    // One per channel, repeated for each operator at +8.
    Dt1Mul = 0x40,
    Tl = 0x60,
    KsAr = 0x80,
    AmeD1r = 0xA0,
    Dt2D2r = 0xC0,
    D1lRr = 0xE0,
}

impl OpmReg {
    /// Register number for `channel`.
    #[inline(always)]
    pub const fn channel(self, channel: u8) -> u8 {
        self as u8 + (channel & 7)
    }

    /// Register number for `channel`, operator `op`.
    #[inline(always)]
    pub const fn operator(self, channel: u8, op: u8) -> u8 {
        self.channel(channel) + 8 * (op & 3)
    }
}

bitflags::bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct OpmStatus: u8 {
        const BUSY    = 0x80;
        const TIMER_B = 0x02;
        const TIMER_A = 0x01;
    }
}

bitflags::bitflags! {
    /// Register `$14`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TimerFlags: u8 {
        const CSM       = 0x80;
        const F_RESET_B = 0x20;
        const F_RESET_A = 0x10;
        const IRQ_EN_B  = 0x08;
        const IRQ_EN_A  = 0x04;
        const LOAD_B    = 0x02;
        const LOAD_A    = 0x01;
    }
}

bitflags::bitflags! {
    /// Output enables in the PAN/FL/CON registers.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct OpmPan: u8 {
        const RIGHT = 0x80;
        const LEFT  = 0x40;
        const BOTH  = Self::RIGHT.bits() | Self::LEFT.bits();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum LfoWave {
    Saw = 0,
    Rectangle = 1,
    Triangle = 2,
    Random = 3,
}

/// Key codes for [`set_oct_note`]. The chip skips every fourth code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum OpmNote {
    Cs = 0x0,
    D = 0x1,
    Ds = 0x2,
    E = 0x4,
    F = 0x5,
    Fs = 0x6,
    G = 0x8,
    Gs = 0x9,
    A = 0xA,
    As = 0xC,
    B = 0xD,
    C = 0xE,
}

#[inline(always)]
fn field(value: u8, width: usize) -> u8 {
    mask(value as u16, width) as u8
}

#[inline(always)]
pub fn status<P: RegisterPort>(bus: &mut P) -> OpmStatus {
    OpmStatus::from_bits_retain(bus.read8(OPM_STATUS))
}

#[inline(always)]
pub fn busy<P: RegisterPort>(bus: &mut P) -> bool {
    status(bus).contains(OpmStatus::BUSY)
}

#[inline(always)]
pub fn timer_a<P: RegisterPort>(bus: &mut P) -> bool {
    status(bus).contains(OpmStatus::TIMER_A)
}

#[inline(always)]
pub fn timer_b<P: RegisterPort>(bus: &mut P) -> bool {
    status(bus).contains(OpmStatus::TIMER_B)
}

#[inline(always)]
fn wait_ready<P: RegisterPort>(bus: &mut P) {
    while busy(bus) {
        spin_loop();
    }
}

/// Write `data` to OPM register `reg`, waiting out the busy flag before the
/// address and again before the data. Spins forever if the chip never
/// becomes ready.
pub fn write<P: RegisterPort>(bus: &mut P, reg: u8, data: u8) {
    wait_ready(bus);
    bus.write8(OPM_ADDRESS, reg);
    wait_ready(bus);
    bus.write8(OPM_DATA, data);
    trace!("opm: {:02X} <- {:02X}", reg, data);
}

// Global ====================================================================

pub fn set_test_mode<P: RegisterPort>(bus: &mut P, on: bool) {
    write(bus, OpmReg::TestMode as u8, if on { 0x01 } else { 0x00 });
}

/// Shares the test mode register; writing one clears the other.
pub fn set_lfo_reset<P: RegisterPort>(bus: &mut P, on: bool) {
    write(bus, OpmReg::TestMode as u8, if on { 0x02 } else { 0x00 });
}

/// Key on/off: `slots` bits 0-3 select operators M1, C1, M2, C2.
pub fn set_key_on<P: RegisterPort>(bus: &mut P, channel: u8, slots: u8) {
    write(bus, OpmReg::KeyOn as u8, (channel & 7) | (field(slots, 4) << 3));
}

/// Noise on channel 7. fnoise = 4MHz / (32 * nfreq).
pub fn set_noise<P: RegisterPort>(bus: &mut P, on: bool, nfreq: u8) {
    let en = if on { 0x80 } else { 0x00 };
    write(bus, OpmReg::Noise as u8, en | field(nfreq, 5));
}

/// Timer A period, 10 bits. Ta = 64 * (1024 - period) / clock.
pub fn set_clka_period<P: RegisterPort>(bus: &mut P, period: u16) {
    let period = mask(period, 10);
    write(bus, OpmReg::ClkAUpper as u8, (period >> 2) as u8);
    write(bus, OpmReg::ClkALower as u8, (period & 0x03) as u8);
}

/// Timer B period. Tb = 1024 * (256 - period) / clock.
pub fn set_clkb_period<P: RegisterPort>(bus: &mut P, period: u8) {
    write(bus, OpmReg::ClkB as u8, period);
}

pub fn set_timer_flags<P: RegisterPort>(bus: &mut P, flags: TimerFlags) {
    write(bus, OpmReg::TimerFlags as u8, flags.bits());
}

pub fn set_lfo_freq<P: RegisterPort>(bus: &mut P, freq: u8) {
    write(bus, OpmReg::LfoFreq as u8, freq);
}

pub fn set_lfo_am_depth<P: RegisterPort>(bus: &mut P, depth: u8) {
    write(bus, OpmReg::LfoDepth as u8, field(depth, 7));
}

pub fn set_lfo_pm_depth<P: RegisterPort>(bus: &mut P, depth: u8) {
    write(bus, OpmReg::LfoDepth as u8, 0x80 | field(depth, 7));
}

/// CT1 selects the 8MHz ADPCM clock, CT2 drives the FDC ready line.
pub fn set_control<P: RegisterPort>(bus: &mut P, ct1_adpcm_8mhz: bool, ct2_fdc_ready: bool, wave: LfoWave) {
    let ct1 = if ct1_adpcm_8mhz { 0x80 } else { 0x00 };
    let ct2 = if ct2_fdc_ready { 0x40 } else { 0x00 };
    write(bus, OpmReg::Control as u8, ct1 | ct2 | wave as u8);
}

// Per channel ================================================================

pub fn set_pan_fl_con<P: RegisterPort>(bus: &mut P, channel: u8, pan: OpmPan, fl: u8, con: u8) {
    write(
        bus,
        OpmReg::PanFlCon.channel(channel),
        pan.bits() | (field(fl, 3) << 3) | field(con, 3),
    );
}

pub fn set_oct_note<P: RegisterPort>(bus: &mut P, channel: u8, octave: u8, note: OpmNote) {
    write(bus, OpmReg::OctNote.channel(channel), note as u8 | (field(octave, 3) << 4));
}

/// Key fraction, 0-63 in 1/64 semitone steps.
pub fn set_key_fraction<P: RegisterPort>(bus: &mut P, channel: u8, fraction: u8) {
    write(bus, OpmReg::Kf.channel(channel), field(fraction, 6) << 2);
}

pub fn set_pms_ams<P: RegisterPort>(bus: &mut P, channel: u8, pms: u8, ams: u8) {
    write(bus, OpmReg::PmsAms.channel(channel), (field(pms, 3) << 4) | field(ams, 2));
}

// Per operator ===============================================================

pub fn set_dt1_mul<P: RegisterPort>(bus: &mut P, channel: u8, op: u8, dt1: u8, mul: u8) {
    write(bus, OpmReg::Dt1Mul.operator(channel, op), (field(dt1, 3) << 4) | field(mul, 4));
}

/// Total level, 0 (loudest) to 127.
pub fn set_tl<P: RegisterPort>(bus: &mut P, channel: u8, op: u8, tl: u8) {
    write(bus, OpmReg::Tl.operator(channel, op), field(tl, 7));
}

pub fn set_ks_ar<P: RegisterPort>(bus: &mut P, channel: u8, op: u8, ks: u8, ar: u8) {
    write(bus, OpmReg::KsAr.operator(channel, op), field(ar, 5) | (field(ks, 2) << 6));
}

pub fn set_ame_d1r<P: RegisterPort>(bus: &mut P, channel: u8, op: u8, ame: bool, d1r: u8) {
    let ame = if ame { 0x80 } else { 0x00 };
    write(bus, OpmReg::AmeD1r.operator(channel, op), ame | field(d1r, 5));
}

pub fn set_dt2_d2r<P: RegisterPort>(bus: &mut P, channel: u8, op: u8, dt2: u8, d2r: u8) {
    write(bus, OpmReg::Dt2D2r.operator(channel, op), (field(dt2, 2) << 6) | field(d2r, 5));
}

pub fn set_d1l_rr<P: RegisterPort>(bus: &mut P, channel: u8, op: u8, d1l: u8, rr: u8) {
    write(bus, OpmReg::D1lRr.operator(channel, op), field(rr, 4) | (field(d1l, 4) << 4));
}
