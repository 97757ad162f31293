//! Error taxonomy for daemon operations.
//!
//! Every failure is classified exactly once, at the boundary of the
//! operation that produced it. Classification prefers the structured
//! HTTP status the daemon transport exposes and falls back to the
//! daemon's known message phrasings only when no status is available.
//! Causes are preserved so callers can walk the `source` chain instead
//! of matching strings.

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`DockerError`].
pub type DockerResult<T> = Result<T, DockerError>;

/// Shared handle to the underlying cause of a failed operation.
///
/// Stored behind an [`Arc`] so scripted test doubles can hand the same
/// error out repeatedly.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Tag identifying the operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Network creation.
    NetworkCreate,
    /// Network removal.
    NetworkRemove,
    /// Network listing.
    NetworkList,
    /// Network inspection.
    NetworkInspect,
    /// Daemon connectivity (construction, ping).
    Connect,
}

impl Op {
    /// Stable string form of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkCreate => "network.create",
            Self::NetworkRemove => "network.remove",
            Self::NetworkList => "network.list",
            Self::NetworkInspect => "network.inspect",
            Self::Connect => "connect",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified daemon operation failure.
#[derive(Error, Diagnostic, Debug, Clone)]
pub enum DockerError {
    /// The daemon is unreachable or the transport failed mid-call.
    #[error("cannot connect to the container daemon")]
    #[diagnostic(
        code(bosun::docker::connection),
        help("Check that the daemon is running and DOCKER_HOST points at it")
    )]
    Connection {
        /// The transport-level cause.
        #[source]
        source: Cause,
    },

    /// The target network does not exist.
    ///
    /// Carries no underlying cause: absence is an expected outcome, not
    /// a transport fault.
    #[error("network not found: {name}")]
    #[diagnostic(code(bosun::docker::not_found))]
    NotFound {
        /// Name of the absent network.
        name: String,
    },

    /// Removal was blocked by live attachments.
    #[error("network {name} has {} attached containers", containers.len())]
    #[diagnostic(
        code(bosun::docker::in_use),
        help("Disconnect or stop the attached containers, then retry")
    )]
    InUse {
        /// Name of the network still in use.
        name: String,
        /// Identifiers of the attached containers.
        containers: Vec<String>,
    },

    /// Unclassified operation failure.
    #[error("{}", operation_display(*op, name, message))]
    #[diagnostic(code(bosun::docker::operation))]
    Operation {
        /// Operation that failed.
        op: Op,
        /// Resource name, empty when the operation is not resource-scoped.
        name: String,
        /// Human-readable message.
        message: String,
        /// Underlying cause, when one exists.
        #[source]
        source: Option<Cause>,
    },
}

fn operation_display(op: Op, name: &str, message: &str) -> String {
    if name.is_empty() {
        format!("{op}: {message}")
    } else {
        format!("{op} {name}: {message}")
    }
}

impl DockerError {
    /// Connection-kind error wrapping a transport cause.
    pub fn connection(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Connection {
            source: Arc::new(source),
        }
    }

    /// Creation failure for `name`.
    pub fn create(name: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Operation {
            op: Op::NetworkCreate,
            name: name.into(),
            message: "failed to create network".to_string(),
            source: Some(Arc::new(source)),
        }
    }

    /// Removal failure for `name`.
    pub fn remove(name: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Operation {
            op: Op::NetworkRemove,
            name: name.into(),
            message: "failed to remove network".to_string(),
            source: Some(Arc::new(source)),
        }
    }

    /// Listing failure; not scoped to a resource.
    pub fn list(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Operation {
            op: Op::NetworkList,
            name: String::new(),
            message: "failed to list networks".to_string(),
            source: Some(Arc::new(source)),
        }
    }

    /// Inspection failure for `name`.
    pub fn inspect(name: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Operation {
            op: Op::NetworkInspect,
            name: name.into(),
            message: "failed to inspect network".to_string(),
            source: Some(Arc::new(source)),
        }
    }

    /// The named network does not exist.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Removal blocked by the given attached containers.
    pub fn in_use(name: impl Into<String>, containers: Vec<String>) -> Self {
        Self::InUse {
            name: name.into(),
            containers,
        }
    }

    /// Operation tag this failure belongs to.
    #[must_use]
    pub const fn op(&self) -> Op {
        match self {
            Self::Connection { .. } => Op::Connect,
            Self::NotFound { .. } => Op::NetworkInspect,
            Self::InUse { .. } => Op::NetworkRemove,
            Self::Operation { op, .. } => *op,
        }
    }

    /// Underlying cause, for downcast-based "is this caused by X" checks.
    ///
    /// Returns the cause itself rather than the shared handle around it,
    /// so `downcast_ref` sees the original error type.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connection { source } => Some(&**source),
            Self::Operation {
                source: Some(source),
                ..
            } => Some(&**source),
            _ => None,
        }
    }

    /// Resource name the failure is scoped to, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Connection { .. } => None,
            Self::NotFound { name } | Self::InUse { name, .. } => Some(name),
            Self::Operation { name, .. } => {
                if name.is_empty() {
                    None
                } else {
                    Some(name)
                }
            }
        }
    }
}

/// Whether the daemon reported the target resource as absent.
///
/// A structured 404 wins; the daemon's known phrasings are the fallback.
pub(crate) fn is_not_found(err: &bollard::errors::Error) -> bool {
    if let bollard::errors::Error::DockerResponseServerError { status_code, .. } = err {
        if *status_code == 404 {
            return true;
        }
    }
    let text = err.to_string();
    text.contains("not found") || text.contains("No such network")
}

/// Whether the daemon reported a same-named resource already existing.
pub(crate) fn is_conflict(err: &bollard::errors::Error) -> bool {
    if let bollard::errors::Error::DockerResponseServerError { status_code, .. } = err {
        if *status_code == 409 {
            return true;
        }
    }
    err.to_string().contains("already exists")
}

/// Whether the daemon refused removal because of live attachments.
pub(crate) fn has_active_endpoints(err: &bollard::errors::Error) -> bool {
    err.to_string().contains("has active endpoints")
}

/// Whether the failure happened below the daemon API (deadline expiry).
pub(crate) fn is_transport(err: &bollard::errors::Error) -> bool {
    matches!(err, bollard::errors::Error::RequestTimeoutError)
}
