//! Command handlers.
//!
//! Handlers are thin: read input, call into the library crates, print the
//! result. Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`.

pub mod config;
pub mod connection;
pub mod extract;
pub mod speak;
pub mod update;
pub mod voices;
