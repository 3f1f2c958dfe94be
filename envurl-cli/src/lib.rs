//! envurl CLI - Command-line interface for envurl.
//!
//! Converts connection URLs into settings, either given directly or read
//! from environment variables and `.env` files.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
