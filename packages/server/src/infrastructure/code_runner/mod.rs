//! CodeRunner 実装

pub mod piston;

pub use piston::PistonCodeRunner;
