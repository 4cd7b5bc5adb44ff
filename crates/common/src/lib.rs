//! Common utilities and types shared across mcprobe components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
