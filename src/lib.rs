//! # X68000 Video Chipset
//!
//! Register-level access to the X68000's display hardware: the CRTC, the
//! video controller (palettes and layer mixing), the PCG (sprites and tile
//! backgrounds), plus the OPM sound chip, joysticks, and vsync waits.
//!
//! ## Quick Start
//!
//! Everything goes through a [`Chipset`], which owns the bus and the shadow
//! copies of the write-only registers:
//!
//! ```ignore
//! use x68k::{Chipset, pcg::{SpritePriority, TileAttr}, vbl};
//!
//! let mut chipset = unsafe { Chipset::mmio() };
//! chipset.init_default();
//!
//! let ship = TileAttr::new(0x20, 1, false, false);
//! loop {
//!     chipset.pcg.add_sprite(&mut chipset.bus, x, y, ship, SpritePriority::AboveBoth);
//!     chipset.pcg.finish_sprites(&mut chipset.bus);
//!     vbl::wait_for_vsync(&mut chipset.bus);
//! }
//! ```
//!
//! ## Shadow Registers
//!
//! Most video registers can't be read back, so each chip keeps a RAM copy of
//! the words that pack several settings together. Setters change one field
//! of the copy and store the full word:
//!
//! - [`crtc::Crtc`] and [`pcg::Pcg`] write on every setter call.
//! - [`vidcon::Vidcon`] only writes on [`commit`](vidcon::Vidcon::commit),
//!   so a batch of priority and enable changes lands at once.
//!
//! Values too wide for their field are masked. Enable the `strict-fields`
//! feature to catch them with a debug assertion instead.
//!
//! ## Testing Without Hardware
//!
//! All access goes through [`RegisterPort`]. [`Mmio`] talks to the real bus;
//! [`RegisterFile`] is an in-memory stand-in that also records every write:
//!
//! ```
//! use x68k::{Chipset, RegisterFile};
//!
//! let mut chipset = Chipset::new(RegisterFile::new());
//! chipset.vidcon.set_prio_sprites(0);
//! chipset.vidcon.commit(&mut chipset.bus);
//! assert_eq!(chipset.bus.peek16(0xE82500), 0x06E4);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod chipset;
pub mod crtc;
pub mod display;
pub mod input;
pub mod opm;
pub mod pcg;
pub mod port;
pub mod vbl;
pub mod vidcon;

mod shadow;

pub use chipset::Chipset;
pub use display::{Display, DisplayMode};
pub use port::{Mmio, RegisterFile, RegisterPort};
