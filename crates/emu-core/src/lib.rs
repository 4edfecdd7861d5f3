//! Core traits shared by the machine crates.
//!
//! Machines expose memory through [`Bus`], port-mapped peripherals through
//! [`IoBus`], and their internal state through [`Observable`].

mod bus;
mod observable;

pub use bus::{Bus, IoBus};
pub use observable::{Observable, Value};
