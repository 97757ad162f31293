//! # bosun-config
//!
//! Configuration loading and validation for the bosun CLI:
//! - Global settings from `~/.config/bosun/config.yaml` (defaults apply
//!   when the file is absent)
//! - Per-project settings from a `bosun.yaml` discovered by walking up
//!   from the working directory

#![warn(missing_docs)]

pub mod loader;
pub mod types;

pub use loader::{ConfigError, Loader};
pub use types::{
    ClusterConfig, Config, Environment, HostsConfig, IngressConfig, NetworkConfig, Project,
    Service,
};
