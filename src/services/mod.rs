//! Services layer
//!
//! This module contains the screen-level logic that sits between the list
//! controllers and the record sources:
//! - Mounting screens and loading their records
//! - Running mutations and refetching afterwards
//! - Generating sequential serial numbers for new records

pub mod screen;
pub mod serial;

pub use screen::{ManagementScreen, ScreenError};
pub use serial::next_serial;
