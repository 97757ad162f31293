//! Normalized view of daemon-managed virtual networks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A daemon-managed virtual network.
///
/// Values returned by any operation carry a non-empty `id` and `name`.
/// `ipam` is `None` when the daemon reports no addressing plan at all;
/// an empty plan (driver set, no pools) is represented distinctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    /// Opaque identifier assigned by the daemon at creation.
    pub id: String,
    /// Human-chosen name, unique among active networks.
    pub name: String,
    /// Network driver (e.g. `bridge`, `overlay`).
    pub driver: String,
    /// Visibility domain (`local` or `swarm`).
    pub scope: String,
    /// Addressing plan, when the daemon reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipam: Option<Ipam>,
    /// Labels attached to the network.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    /// Identifiers of containers attached at inspect time.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<String>,
    /// Creation timestamp assigned by the daemon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// IP address management configuration for a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipam {
    /// IPAM driver name.
    pub driver: String,
    /// Address pools, in daemon order.
    pub config: Vec<IpamConfig>,
}

/// A single IPAM address pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpamConfig {
    /// Subnet in CIDR notation (e.g. `172.16.34.0/23`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subnet: String,
    /// Gateway address for the subnet.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gateway: String,
}

/// Caller-supplied creation intent, consumed once per create call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCreateOptions {
    /// Network driver; empty means the daemon's bridge mode.
    pub driver: String,
    /// Subnet in CIDR notation; empty means no addressing plan.
    pub subnet: String,
    /// Gateway address; only meaningful together with `subnet`.
    pub gateway: String,
    /// Labels to attach (ownership tagging, filtering).
    pub labels: HashMap<String, String>,
    /// Restrict external access to the network.
    pub internal: bool,
    /// Allow manual container attachment.
    pub attachable: bool,
}

/// Filters narrowing a daemon-side listing query.
///
/// Each key (`name`, `id`, `driver`, `label`) maps to the values the
/// daemon accepts for it; one key may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkListOptions {
    /// Filter key to accepted values.
    pub filters: HashMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_options_defaults() {
        let opts = NetworkCreateOptions::default();
        assert!(opts.driver.is_empty());
        assert!(opts.subnet.is_empty());
        assert!(opts.gateway.is_empty());
        assert!(opts.labels.is_empty());
        assert!(!opts.internal);
        assert!(!opts.attachable);
    }

    #[test]
    fn list_options_defaults() {
        let opts = NetworkListOptions::default();
        assert!(opts.filters.is_empty());
    }

    #[test]
    fn network_serializes_without_empty_fields() {
        let net = Network {
            id: "net-123".to_string(),
            name: "test-net".to_string(),
            driver: "bridge".to_string(),
            scope: "local".to_string(),
            ipam: None,
            labels: HashMap::new(),
            containers: Vec::new(),
            created: None,
        };

        let json = serde_json::to_value(&net).unwrap();
        assert_eq!(json["id"], "net-123");
        assert!(json.get("ipam").is_none());
        assert!(json.get("labels").is_none());
        assert!(json.get("containers").is_none());
        assert!(json.get("created").is_none());
    }

    #[test]
    fn network_serializes_ipam_pools() {
        let net = Network {
            id: "net-123".to_string(),
            name: "test-net".to_string(),
            driver: "bridge".to_string(),
            scope: "local".to_string(),
            ipam: Some(Ipam {
                driver: "default".to_string(),
                config: vec![IpamConfig {
                    subnet: "172.16.0.0/16".to_string(),
                    gateway: "172.16.0.1".to_string(),
                }],
            }),
            labels: HashMap::from([("env".to_string(), "test".to_string())]),
            containers: vec!["c1".to_string(), "c2".to_string()],
            created: None,
        };

        let json = serde_json::to_value(&net).unwrap();
        assert_eq!(json["ipam"]["driver"], "default");
        assert_eq!(json["ipam"]["config"][0]["subnet"], "172.16.0.0/16");
        assert_eq!(json["ipam"]["config"][0]["gateway"], "172.16.0.1");
        assert_eq!(json["containers"][1], "c2");
    }

    #[test]
    fn empty_ipam_plan_is_distinct_from_none() {
        let without_plan = Network {
            id: "a".to_string(),
            name: "a".to_string(),
            driver: "bridge".to_string(),
            scope: "local".to_string(),
            ipam: None,
            labels: HashMap::new(),
            containers: Vec::new(),
            created: None,
        };
        let empty_plan = Network {
            ipam: Some(Ipam {
                driver: "default".to_string(),
                config: Vec::new(),
            }),
            ..without_plan.clone()
        };
        assert_ne!(without_plan, empty_plan);
    }
}
