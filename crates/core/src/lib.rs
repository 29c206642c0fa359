//! Shared building blocks for the D365FO data-management bridge.
//!
//! Holds the environment-sourced configuration, the inbound business-event
//! model and its persisted projection, and the per-invocation import request.

pub mod business_event;
pub mod config;
pub mod error;
pub mod event_record;
pub mod import;
pub mod json_date;
pub mod types;
