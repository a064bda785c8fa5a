//! Data Transfer Objects (DTOs) for the HTTP API.
//!
//! - `http`: request bodies and response payloads
//! - `conversion`: conversions between DTOs and domain types

pub mod conversion;
pub mod http;
