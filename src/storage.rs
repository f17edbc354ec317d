//! Persistence of rule files.
//!
//! JSON is the interchange format for both uncompiled and compiled files.
//! The binary snapshot stores a compiled file for fast reloading.

pub mod json;
#[cfg(feature = "snapshot")]
pub mod snapshot;
