// src/lib.rs
pub mod config;
pub mod connectors;
pub mod core;
pub mod error;
pub mod market;
pub mod tui;
pub mod types;
pub mod utils;
