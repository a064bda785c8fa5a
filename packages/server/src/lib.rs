//! Real-time collaborative editor server.
//!
//! Rooms hold a shared document, cursors, chat and typing indicators. Changes
//! are fanned out to the other participants of a room over per-user
//! Server-Sent Events streams.

pub mod app;
pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
