//! Command-line front end for narrator.
//!
//! `main.rs` parses arguments, calls [`bootstrap`] and hands the resulting
//! [`CliContext`] to one of the [`handlers`].

#![deny(unused_crate_dependencies)]

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod input;
pub mod parser;

pub use bootstrap::{CliContext, bootstrap, init_tracing};
pub use commands::{Commands, UpdateCommand, VoicesCommand};
pub use config_commands::{ConfigCommand, PersonaCommand};
pub use error::CliError;
pub use parser::Cli;
