//! Request handlers. Each submodule maps domain and storage errors via
//! [`AppError`](crate::error::AppError).

pub mod status;
