//! Connection to the container runtime daemon.
//!
//! [`DaemonClient`] owns the transport (local socket or remote TCP/TLS
//! endpoint) and exposes liveness and shutdown; the network operations
//! layered over the same connection live in [`crate::network`].

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bollard::{API_DEFAULT_VERSION, ClientVersion, Docker};
use parking_lot::Mutex;
use thiserror::Error;

use crate::error::{DockerError, DockerResult};
use crate::types::{Network, NetworkCreateOptions, NetworkListOptions};

/// Default per-call deadline for daemon round trips.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Socket the daemon listens on when no host is configured.
const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

/// Capability interface over the container runtime daemon.
///
/// [`DaemonClient`] is the production implementation; tests substitute
/// [`crate::MockClient`].
#[async_trait]
pub trait Client: Send + Sync {
    /// Ensure a network named `name` exists and return its id, whether
    /// newly created or pre-existing.
    async fn network_create(&self, name: &str, opts: NetworkCreateOptions) -> DockerResult<String>;

    /// Ensure no network named `name` exists afterward. Removing an
    /// absent network is not an error.
    async fn network_remove(&self, name: &str) -> DockerResult<()>;

    /// List networks matching the given filters. An empty result is
    /// valid.
    async fn network_list(&self, opts: NetworkListOptions) -> DockerResult<Vec<Network>>;

    /// Look up a single network by name.
    async fn network_inspect(&self, name: &str) -> DockerResult<Network>;

    /// Confirm the daemon is reachable with one lightweight round trip.
    async fn ping(&self) -> DockerResult<()>;

    /// Release transport resources. Safe to call more than once.
    async fn close(&self) -> DockerResult<()>;
}

/// TLS material for a remote, TLS-protected daemon.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Client private key (PEM).
    pub key: PathBuf,
    /// Client certificate (PEM).
    pub cert: PathBuf,
    /// Certificate authority bundle (PEM).
    pub ca: PathBuf,
}

/// Configuration for [`DaemonClient::connect`].
#[derive(Default)]
pub struct ClientOptions {
    host: String,
    timeout: Option<Duration>,
    api_version: String,
    tls: Option<TlsConfig>,
    transport: Option<Docker>,
}

impl ClientOptions {
    /// Options with all defaults: daemon default socket, 30 second
    /// deadline, version negotiation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Daemon endpoint, e.g. `unix:///var/run/docker.sock` or
    /// `tcp://host:2376`. Empty selects the daemon default socket.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Per-call deadline for daemon round trips.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Pin the daemon API version (e.g. `1.44`). Empty negotiates the
    /// version with the daemon.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// TLS material for remote daemons. Ignored for socket transports.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Use a pre-built transport handle. When given, host, timeout and
    /// TLS settings are not applied: explicit transport wins over
    /// derived transport.
    #[must_use]
    pub fn transport(mut self, docker: Docker) -> Self {
        self.transport = Some(docker);
        self
    }
}

/// Operations issued after [`Client::close`] fail with this cause.
#[derive(Debug, Error)]
#[error("client is closed")]
struct ClosedError;

/// Production client for the container runtime daemon.
///
/// Holds no mutable state beyond the closable transport handle; retry
/// policy, if any, belongs to the caller.
pub struct DaemonClient {
    transport: Mutex<Option<Docker>>,
    timeout: Option<Duration>,
}

impl DaemonClient {
    /// Build a client from the given options.
    ///
    /// # Errors
    ///
    /// Returns a connection-kind error when the transport cannot be
    /// built or version negotiation with the daemon fails.
    pub async fn connect(options: ClientOptions) -> DockerResult<Self> {
        if let Some(docker) = options.transport {
            // The caller's transport carries its own deadline policy.
            return Ok(Self {
                transport: Mutex::new(Some(docker)),
                timeout: None,
            });
        }

        let timeout = options.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let pinned = match options.api_version.as_str() {
            "" => None,
            raw => Some(parse_api_version(raw)?),
        };
        let version = pinned.as_ref().unwrap_or(API_DEFAULT_VERSION);

        let host = if options.host.is_empty() {
            DEFAULT_HOST
        } else {
            options.host.as_str()
        };

        let docker = if remote_host(host) {
            match &options.tls {
                Some(tls) => Docker::connect_with_ssl(
                    host,
                    &tls.key,
                    &tls.cert,
                    &tls.ca,
                    timeout.as_secs(),
                    version,
                ),
                None => Docker::connect_with_http(host, timeout.as_secs(), version),
            }
        } else {
            Docker::connect_with_socket(host, timeout.as_secs(), version)
        }
        .map_err(DockerError::connection)?;

        let docker = if pinned.is_none() {
            docker
                .negotiate_version()
                .await
                .map_err(DockerError::connection)?
        } else {
            docker
        };

        tracing::debug!(host, timeout = ?timeout, "connected to container daemon");

        Ok(Self {
            transport: Mutex::new(Some(docker)),
            timeout: Some(timeout),
        })
    }

    /// Current transport handle, or a connection-kind error after close.
    pub(crate) fn transport(&self) -> DockerResult<Docker> {
        self.transport
            .lock()
            .clone()
            .ok_or_else(|| DockerError::connection(ClosedError))
    }

    /// Run one daemon round trip under the per-call deadline.
    ///
    /// Expiry surfaces as the transport's own timeout error so the
    /// per-operation classification treats it as a connection fault.
    pub(crate) async fn call<T, F>(&self, fut: F) -> Result<T, bollard::errors::Error>
    where
        F: Future<Output = Result<T, bollard::errors::Error>> + Send,
    {
        match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .unwrap_or(Err(bollard::errors::Error::RequestTimeoutError)),
            None => fut.await,
        }
    }

    /// Liveness probe against the daemon.
    pub(crate) async fn ping_daemon(&self) -> DockerResult<()> {
        let docker = self.transport()?;
        self.call(docker.ping())
            .await
            .map_err(DockerError::connection)?;
        Ok(())
    }

    /// Drop the transport handle, releasing idle connections.
    pub(crate) fn close_transport(&self) {
        if self.transport.lock().take().is_some() {
            tracing::debug!("released daemon transport");
        }
    }
}

/// Whether the host addresses a remote daemon over HTTP(S).
fn remote_host(host: &str) -> bool {
    host.starts_with("tcp://") || host.starts_with("http://") || host.starts_with("https://")
}

/// Parse a `major.minor` API version string.
fn parse_api_version(raw: &str) -> DockerResult<ClientVersion> {
    let invalid = || DockerError::Operation {
        op: crate::error::Op::Connect,
        name: String::new(),
        message: format!("invalid API version: {raw}"),
        source: None,
    };

    let (major, minor) = raw.split_once('.').ok_or_else(invalid)?;
    Ok(ClientVersion {
        major_version: major.parse().map_err(|_| invalid())?,
        minor_version: minor.parse().map_err(|_| invalid())?,
    })
}
