//! # bosun
//!
//! bosun bridges local development with production container and
//! cluster orchestration. Services run locally against a managed
//! container network with the same configuration they deploy with.
//!
//! The `net` subcommands manage daemon networks directly; `up` and
//! `down` ensure or remove the managed network from configuration;
//! `doctor` runs environment health checks.

#![warn(missing_docs)]

pub mod cli;
