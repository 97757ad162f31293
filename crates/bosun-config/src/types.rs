//! Configuration schema for global and per-project settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Global configuration (`~/.config/bosun/config.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Container runtime flavor (`colima`, `docker`, `nerdctl`, `podman`).
    pub container: String,

    /// Host resolution settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<HostsConfig>,

    /// Managed container network settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkConfig>,

    /// Deployment clusters by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub clusters: HashMap<String, ClusterConfig>,
}

impl Default for Config {
    /// Sensible defaults, used when no config file exists.
    fn default() -> Self {
        Self {
            container: "colima".to_string(),
            hosts: Some(HostsConfig {
                mode: "etc".to_string(),
                suffix: None,
            }),
            network: Some(NetworkConfig::default()),
            clusters: HashMap::new(),
        }
    }
}

impl Config {
    /// Managed network settings, falling back to the defaults when the
    /// config file omits the section.
    #[must_use]
    pub fn network(&self) -> NetworkConfig {
        self.network.clone().unwrap_or_default()
    }
}

/// Host resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostsConfig {
    /// Resolution mode (`etc` or `kubedns`).
    pub mode: String,
    /// Optional hostname suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// Settings for the container network the CLI manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network name.
    pub name: String,
    /// Subnet in CIDR notation.
    pub cidr: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "bosun-net".to_string(),
            cidr: "172.16.34.0/23".to_string(),
        }
    }
}

/// A deployment cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster provider (`compose` or `k8s`).
    pub provider: String,
    /// Provider context name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Default namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Per-project configuration (`bosun.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name (`^[a-z][a-z0-9-]*$`).
    pub project: String,
    /// Deployment environments by name.
    #[serde(default)]
    pub environments: HashMap<String, Environment>,
    /// Services the project runs.
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Name of the cluster the environment deploys to.
    pub cluster: String,
}

/// A service in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name (`^[a-z][a-z0-9-]*$`).
    pub name: String,
    /// Deployment pack the service is built from.
    pub pack: String,
    /// Optional namespace override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Names of services this one depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    /// Replica count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    /// Ingress settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<IngressConfig>,
}

/// Ingress settings for a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressConfig {
    /// Hostname to route.
    pub host: String,
    /// Path prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Terminate TLS.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tls: bool,
}

/// Whether a name matches `^[a-z][a-z0-9-]*$`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.container, "colima");
        assert_eq!(cfg.network().name, "bosun-net");
        assert_eq!(cfg.network().cidr, "172.16.34.0/23");
        assert_eq!(cfg.hosts.unwrap().mode, "etc");
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("api"));
        assert!(is_valid_name("api-v2"));
        assert!(is_valid_name("a1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Api"));
        assert!(!is_valid_name("1api"));
        assert!(!is_valid_name("api_v2"));
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let yaml = "container: docker\nnetwork:\n  name: dev-net\n  cidr: 10.1.0.0/16\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.container, "docker");
        assert_eq!(cfg.network().name, "dev-net");
        assert!(cfg.clusters.is_empty());
    }

    #[test]
    fn project_parses_services() {
        let yaml = r"
project: shop
environments:
  dev:
    cluster: local
services:
  - name: api
    pack: rust-service
    requires: [db]
  - name: db
    pack: postgres
";
        let proj: Project = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(proj.project, "shop");
        assert_eq!(proj.services.len(), 2);
        assert_eq!(proj.services[0].requires, vec!["db"]);
        assert_eq!(proj.environments["dev"].cluster, "local");
    }
}
