//! Core traits and types shared by the emulator crates.
//!
//! A CPU executes whole instructions against a [`Bus`] and reports the
//! T-cycles each one took. Everything else (video, timers, the driver loop)
//! paces itself from those cycle counts.

mod bus;
mod cpu;
mod observable;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
