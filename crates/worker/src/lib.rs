//! Trigger host for the package import.
//!
//! Watches a landing directory (typically a mounted blob container) for
//! `{name}.zip` files and runs one import per landed file.

pub mod config;
pub mod landing;
pub mod trigger;
