//! Infrastructure layer
//!
//! Domain 層の trait の具体的な実装と、HTTP の DTO を提供します。

pub mod code_runner;
pub mod dto;
pub mod message_pusher;
pub mod repository;
