//! Utilities shared by the CodeSync packages: logging setup and time helpers.

pub mod logger;
pub mod time;
