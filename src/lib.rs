// src/lib.rs
//! Cross-site consistency checks for published counts.
//!
//! Pages are fetched once per run into a [`store::DocumentCache`], numbers
//! are pulled out of them with XPath-style locators ([`extract`]) and the
//! scenarios in [`specs`] compare the readings ([`check`]).

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod aggregate;
pub mod check;
pub mod cli;
pub mod config;
pub mod core;
pub mod extract;
pub mod progress;
pub mod runner;
pub mod specs;
pub mod store;
