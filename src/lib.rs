#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod log;

mod error;

pub mod acquisition;
pub mod config;
pub mod device;
pub mod frame;
pub mod interface;
pub mod params;
#[cfg(feature = "std")]
pub mod pipeline;
pub mod registers;
pub mod thermocouple;

pub use crate::device::Ads126x;
pub use crate::error::{Error, ReadError, Result};
