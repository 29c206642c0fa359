//! Package import trigger: token, write URL, upload, import.

pub mod package_import;

pub use package_import::{ImportError, ImportOutcome, PackageImporter};
