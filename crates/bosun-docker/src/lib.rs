//! # bosun-docker
//!
//! Client for the container runtime daemon's network management API.
//!
//! The daemon offers no atomic create-if-absent primitive, so this crate
//! synthesizes idempotency client-side: create checks for an existing
//! network first and re-checks when the daemon reports a conflict, and
//! remove treats an absent network as success.
//!
//! All operations are exposed through the [`Client`] capability trait so
//! tests can substitute the deterministic in-memory [`MockClient`].
//!
//! ## Usage
//!
//! ```no_run
//! use bosun_docker::{Client, ClientOptions, DaemonClient, NetworkCreateOptions};
//!
//! # async fn example() -> bosun_docker::DockerResult<()> {
//! let client = DaemonClient::connect(ClientOptions::new()).await?;
//! client.ping().await?;
//!
//! let opts = NetworkCreateOptions {
//!     subnet: "172.16.34.0/23".to_string(),
//!     ..Default::default()
//! };
//! let id = client.network_create("svc-net", opts).await?;
//! println!("network ready: {id}");
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod mock;
pub mod network;
pub mod types;

pub use client::{Client, ClientOptions, DaemonClient, TlsConfig, DEFAULT_TIMEOUT};
pub use error::{DockerError, DockerResult, Op};
pub use mock::{MockClient, NetworkCreateCall};
pub use network::DEFAULT_DRIVER;
pub use types::{Ipam, IpamConfig, Network, NetworkCreateOptions, NetworkListOptions};
