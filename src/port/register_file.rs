//! # Simulated Register File
//!
//! A sparse, fixed-capacity stand-in for the X68000 I/O space. Words live in
//! a `heapless` index map keyed by even address; unwritten addresses read as
//! zero. There is room for [`WORDS`] distinct addresses, enough for both PCG
//! nametables, the sprite table, every palette and the chip registers at
//! once. Every write through the [`RegisterPort`] trait is also appended to a
//! journal holding the most recent [`JOURNAL`] writes, so tests
//! can check ordering as well as final values.
//!
//! [`RegisterFile::poke16`] presets a value without journaling it, which is
//! how status bits (OPM busy, MFP GPIP) are simulated.

use heapless::{FnvIndexMap, HistoryBuffer};
use log::warn;

use crate::port::RegisterPort;

/// One journaled bus write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BusWrite {
    Byte { addr: u32, value: u8 },
    Word { addr: u32, value: u16 },
}

impl BusWrite {
    pub fn addr(&self) -> u32 {
        match *self {
            BusWrite::Byte { addr, .. } | BusWrite::Word { addr, .. } => addr,
        }
    }
}

/// Distinct word addresses that can hold a value. Must be a power of two.
pub const WORDS: usize = 16384;
/// Writes kept in the journal; older ones fall off the front.
pub const JOURNAL: usize = 1024;

pub struct RegisterFile {
    words: FnvIndexMap<u32, u16, WORDS>,
    journal: HistoryBuffer<BusWrite, JOURNAL>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            words: FnvIndexMap::new(),
            journal: HistoryBuffer::new(),
        }
    }

    /// Current word at `addr` (rounded down to even), without journaling.
    pub fn peek16(&self, addr: u32) -> u16 {
        self.words.get(&(addr & !1)).copied().unwrap_or(0)
    }

    /// Current byte at `addr`, without journaling.
    pub fn peek8(&self, addr: u32) -> u8 {
        let word = self.peek16(addr);
        if addr & 1 == 0 { (word >> 8) as u8 } else { word as u8 }
    }

    /// Preset a word without journaling it.
    pub fn poke16(&mut self, addr: u32, value: u16) {
        self.store(addr & !1, value);
    }

    /// Preset a byte without journaling it.
    pub fn poke8(&mut self, addr: u32, value: u8) {
        let word = self.peek16(addr);
        let word = if addr & 1 == 0 {
            (word & 0x00FF) | ((value as u16) << 8)
        } else {
            (word & 0xFF00) | value as u16
        };
        self.store(addr & !1, word);
    }

    /// Journaled writes, oldest first.
    pub fn writes(&self) -> impl Iterator<Item = &BusWrite> + '_ {
        self.journal.oldest_ordered()
    }

    /// Journaled writes that hit `addr`, oldest first.
    pub fn writes_to(&self, addr: u32) -> impl Iterator<Item = &BusWrite> + '_ {
        self.writes().filter(move |w| w.addr() == addr)
    }

    pub fn last_write(&self) -> Option<&BusWrite> {
        self.journal.recent()
    }

    pub fn write_count(&self) -> usize {
        self.journal.len()
    }

    pub fn clear_writes(&mut self) {
        self.journal.clear();
    }

    fn store(&mut self, addr: u32, value: u16) {
        if self.words.insert(addr, value).is_err() {
            warn!("register file full, dropping write of {:04X} to {:06X}", value, addr);
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterPort for RegisterFile {
    fn read8(&mut self, addr: u32) -> u8 {
        self.peek8(addr)
    }

    fn read16(&mut self, addr: u32) -> u16 {
        self.peek16(addr)
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.poke8(addr, value);
        self.journal.write(BusWrite::Byte { addr, value });
    }

    fn write16(&mut self, addr: u32, value: u16) {
        self.poke16(addr, value);
        self.journal.write(BusWrite::Word { addr, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_addresses_read_zero() {
        let mut rf = RegisterFile::new();
        assert_eq!(rf.read16(0xE80000), 0);
        assert_eq!(rf.read8(0xE9A001), 0);
    }

    #[test]
    fn bytes_are_big_endian_halves_of_words() {
        let mut rf = RegisterFile::new();
        rf.write16(0xE90000, 0x12AB);
        assert_eq!(rf.read8(0xE90000), 0x12);
        assert_eq!(rf.read8(0xE90001), 0xAB);

        rf.write8(0xE90001, 0x34);
        assert_eq!(rf.read16(0xE90000), 0x1234);
        rf.write8(0xE90000, 0x56);
        assert_eq!(rf.read16(0xE90000), 0x5634);
    }

    #[test]
    fn journal_records_writes_in_order() {
        let mut rf = RegisterFile::new();
        rf.write16(0xE82400, 1);
        rf.write8(0xE80481, 2);
        rf.write16(0xE82400, 3);

        let log: heapless::Vec<BusWrite, 8> = rf.writes().copied().collect();
        assert_eq!(
            log.as_slice(),
            &[
                BusWrite::Word { addr: 0xE82400, value: 1 },
                BusWrite::Byte { addr: 0xE80481, value: 2 },
                BusWrite::Word { addr: 0xE82400, value: 3 },
            ]
        );
        assert_eq!(rf.writes_to(0xE82400).count(), 2);
        assert_eq!(rf.last_write(), Some(&BusWrite::Word { addr: 0xE82400, value: 3 }));
    }

    #[test]
    fn pokes_are_not_journaled() {
        let mut rf = RegisterFile::new();
        rf.poke16(0xE88000, 0x0040);
        rf.poke8(0xE90003, 0x80);
        assert_eq!(rf.write_count(), 0);
        assert_eq!(rf.read16(0xE88000), 0x0040);
        assert_eq!(rf.read8(0xE90003), 0x80);
    }

    #[test]
    fn holds_two_nametables_and_the_sprite_table() {
        let mut rf = RegisterFile::new();
        for i in 0..8192u32 {
            rf.write16(0xEBC000 + 2 * i, i as u16);
        }
        for i in 0..512u32 {
            rf.write16(0xEB0000 + 2 * i, 0x8000 | i as u16);
        }
        assert_eq!(rf.peek16(0xEBC000), 0);
        assert_eq!(rf.peek16(0xEBC000 + 2 * 4095), 4095);
        assert_eq!(rf.peek16(0xEBC000 + 2 * 8191), 8191);
        assert_eq!(rf.peek16(0xEB0000 + 2 * 511), 0x81FF);
    }

    #[test]
    fn clear_writes_keeps_values() {
        let mut rf = RegisterFile::new();
        rf.write16(0xEB0808, 0x0200);
        rf.clear_writes();
        assert_eq!(rf.write_count(), 0);
        assert_eq!(rf.peek16(0xEB0808), 0x0200);
    }
}
