//! Network lifecycle operations.
//!
//! The daemon has no atomic create-if-absent primitive, so create runs a
//! compensating protocol: check for an existing network, create, and
//! re-check when the daemon reports a conflict. Remove treats an absent
//! network as success. Classification of daemon failures happens here,
//! once per operation.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::Docker;
use bollard::models;
use bollard::network::{CreateNetworkOptions, InspectNetworkOptions, ListNetworksOptions};
use chrono::{DateTime, Utc};

use crate::client::{Client, DaemonClient};
use crate::error::{self, DockerError, DockerResult};
use crate::types::{Ipam, IpamConfig, Network, NetworkCreateOptions, NetworkListOptions};

/// Driver used when creation options leave the driver unset.
pub const DEFAULT_DRIVER: &str = "bridge";

#[async_trait]
impl Client for DaemonClient {
    async fn network_create(&self, name: &str, opts: NetworkCreateOptions) -> DockerResult<String> {
        let docker = self.transport()?;

        // Idempotent-create, step 1: the desired end state may already
        // hold.
        let existing = match self.find_network_by_name(&docker, name).await {
            Ok(found) => found,
            Err(err) if error::is_transport(&err) => return Err(DockerError::connection(err)),
            Err(err) => return Err(DockerError::create(name, err)),
        };
        if let Some(net) = existing {
            tracing::debug!(name, id = %net.id, "network already exists");
            return Ok(net.id);
        }

        let config = creation_request(name, &opts);
        match self.call(docker.create_network(config)).await {
            Ok(resp) => {
                let id = resp.id.unwrap_or_default();
                tracing::info!(name, %id, "network created");
                Ok(id)
            }
            Err(err) if error::is_conflict(&err) => {
                // A concurrent caller created the name between the lookup
                // and the create call. Re-run the exact-match query; if
                // that also fails or finds nothing, surface the original
                // creation error rather than masking it.
                if let Ok(Some(net)) = self.find_network_by_name(&docker, name).await {
                    tracing::debug!(name, id = %net.id, "lost creation race, reusing winner");
                    return Ok(net.id);
                }
                Err(DockerError::create(name, err))
            }
            Err(err) if error::is_transport(&err) => Err(DockerError::connection(err)),
            Err(err) => Err(DockerError::create(name, err)),
        }
    }

    async fn network_remove(&self, name: &str) -> DockerResult<()> {
        let docker = self.transport()?;

        match self.call(docker.remove_network(name)).await {
            Ok(()) => {
                tracing::info!(name, "network removed");
                Ok(())
            }
            Err(err) if error::is_not_found(&err) => {
                // Removal of an absent resource is not an error.
                tracing::debug!(name, "network already absent");
                Ok(())
            }
            Err(err) if error::is_transport(&err) => Err(DockerError::connection(err)),
            Err(err) => {
                if error::has_active_endpoints(&err) {
                    // Discover who is attached so the caller can decide
                    // to detach first.
                    if let Ok(net) = self.network_inspect(name).await {
                        if !net.containers.is_empty() {
                            return Err(DockerError::in_use(name, net.containers));
                        }
                    }
                }
                Err(DockerError::remove(name, err))
            }
        }
    }

    async fn network_list(&self, opts: NetworkListOptions) -> DockerResult<Vec<Network>> {
        let docker = self.transport()?;

        let options = ListNetworksOptions {
            filters: opts.filters,
        };
        let networks = self
            .call(docker.list_networks(Some(options)))
            .await
            .map_err(|err| {
                if error::is_transport(&err) {
                    DockerError::connection(err)
                } else {
                    DockerError::list(err)
                }
            })?;

        Ok(networks.into_iter().map(network_from_daemon).collect())
    }

    async fn network_inspect(&self, name: &str) -> DockerResult<Network> {
        let docker = self.transport()?;

        match self
            .call(docker.inspect_network(name, None::<InspectNetworkOptions<String>>))
            .await
        {
            Ok(net) => Ok(network_from_daemon(net)),
            Err(err) if error::is_not_found(&err) => Err(DockerError::not_found(name)),
            Err(err) if error::is_transport(&err) => Err(DockerError::connection(err)),
            Err(err) => Err(DockerError::inspect(name, err)),
        }
    }

    async fn ping(&self) -> DockerResult<()> {
        self.ping_daemon().await
    }

    async fn close(&self) -> DockerResult<()> {
        self.close_transport();
        Ok(())
    }
}

impl DaemonClient {
    /// Find a network by exact name.
    ///
    /// The daemon's name filter also returns substring matches, so the
    /// result is narrowed client-side.
    async fn find_network_by_name(
        &self,
        docker: &Docker,
        name: &str,
    ) -> Result<Option<Network>, bollard::errors::Error> {
        let filters = HashMap::from([("name".to_string(), vec![name.to_string()])]);
        let networks = self
            .call(docker.list_networks(Some(ListNetworksOptions { filters })))
            .await?;

        Ok(exact_match(networks.into_iter().map(network_from_daemon), name))
    }
}

/// Narrow a name-filtered listing to the exact match, if any.
fn exact_match(networks: impl IntoIterator<Item = Network>, name: &str) -> Option<Network> {
    networks.into_iter().find(|n| n.name == name)
}

/// Build the daemon-native creation request.
fn creation_request(name: &str, opts: &NetworkCreateOptions) -> CreateNetworkOptions<String> {
    let driver = if opts.driver.is_empty() {
        DEFAULT_DRIVER
    } else {
        opts.driver.as_str()
    };

    // An addressing plan is attached only when a subnet was supplied.
    let ipam = if opts.subnet.is_empty() {
        models::Ipam::default()
    } else {
        models::Ipam {
            driver: Some("default".to_string()),
            config: Some(vec![models::IpamConfig {
                subnet: Some(opts.subnet.clone()),
                gateway: none_if_empty(&opts.gateway),
                ..Default::default()
            }]),
            ..Default::default()
        }
    };

    CreateNetworkOptions {
        name: name.to_string(),
        driver: driver.to_string(),
        internal: opts.internal,
        attachable: opts.attachable,
        labels: opts.labels.clone(),
        ipam,
        ..Default::default()
    }
}

/// Convert a daemon-native network record into the normalized shape.
fn network_from_daemon(net: models::Network) -> Network {
    let mut containers: Vec<String> = net
        .containers
        .map(|attached| attached.into_keys().collect())
        .unwrap_or_default();
    containers.sort_unstable();

    Network {
        id: net.id.unwrap_or_default(),
        name: net.name.unwrap_or_default(),
        driver: net.driver.unwrap_or_default(),
        scope: net.scope.unwrap_or_default(),
        ipam: net.ipam.and_then(ipam_from_daemon),
        labels: net.labels.unwrap_or_default(),
        containers,
        created: net.created.as_deref().and_then(parse_created),
    }
}

/// Convert the daemon's IPAM record, distinguishing "no addressing plan"
/// from an empty one.
fn ipam_from_daemon(ipam: models::Ipam) -> Option<Ipam> {
    let driver = ipam.driver.unwrap_or_default();
    let config: Vec<IpamConfig> = ipam
        .config
        .unwrap_or_default()
        .into_iter()
        .map(|pool| IpamConfig {
            subnet: pool.subnet.unwrap_or_default(),
            gateway: pool.gateway.unwrap_or_default(),
        })
        .collect();

    if driver.is_empty() && config.is_empty() {
        return None;
    }
    Some(Ipam { driver, config })
}

fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Network {
        Network {
            id: format!("id-{name}"),
            name: name.to_string(),
            driver: "bridge".to_string(),
            scope: "local".to_string(),
            ipam: None,
            labels: HashMap::new(),
            containers: Vec::new(),
            created: None,
        }
    }

    #[test]
    fn exact_match_ignores_substring_hits() {
        // The daemon's name filter returns partial matches.
        let listed = vec![named("svc-net-blue"), named("svc-net"), named("my-svc-net")];
        let found = exact_match(listed, "svc-net").expect("exact name present");
        assert_eq!(found.id, "id-svc-net");
    }

    #[test]
    fn exact_match_empty_when_only_substrings() {
        let listed = vec![named("svc-net-blue"), named("my-svc-net")];
        assert!(exact_match(listed, "svc-net").is_none());
    }

    #[test]
    fn creation_request_defaults_driver() {
        let request = creation_request("svc-net", &NetworkCreateOptions::default());
        assert_eq!(request.name, "svc-net");
        assert_eq!(request.driver, DEFAULT_DRIVER);
        assert!(request.ipam.config.is_none());
        assert!(!request.internal);
        assert!(!request.attachable);
    }

    #[test]
    fn creation_request_keeps_explicit_driver() {
        let opts = NetworkCreateOptions {
            driver: "overlay".to_string(),
            internal: true,
            attachable: true,
            ..Default::default()
        };
        let request = creation_request("svc-net", &opts);
        assert_eq!(request.driver, "overlay");
        assert!(request.internal);
        assert!(request.attachable);
    }

    #[test]
    fn creation_request_attaches_single_pool() {
        let opts = NetworkCreateOptions {
            subnet: "172.16.34.0/23".to_string(),
            gateway: "172.16.34.1".to_string(),
            ..Default::default()
        };
        let request = creation_request("svc-net", &opts);

        let pools = request.ipam.config.expect("addressing plan attached");
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].subnet.as_deref(), Some("172.16.34.0/23"));
        assert_eq!(pools[0].gateway.as_deref(), Some("172.16.34.1"));
    }

    #[test]
    fn creation_request_omits_empty_gateway() {
        let opts = NetworkCreateOptions {
            subnet: "10.0.0.0/8".to_string(),
            ..Default::default()
        };
        let request = creation_request("svc-net", &opts);

        let pools = request.ipam.config.expect("addressing plan attached");
        assert_eq!(pools[0].gateway, None);
    }

    #[test]
    fn conversion_fills_required_fields() {
        let daemon_net = models::Network {
            id: Some("net-123".to_string()),
            name: Some("svc-net".to_string()),
            driver: Some("bridge".to_string()),
            scope: Some("local".to_string()),
            created: Some("2026-02-01T10:30:00.000000000Z".to_string()),
            ..Default::default()
        };

        let net = network_from_daemon(daemon_net);
        assert_eq!(net.id, "net-123");
        assert_eq!(net.name, "svc-net");
        assert_eq!(net.driver, "bridge");
        assert_eq!(net.scope, "local");
        assert!(net.ipam.is_none());
        assert!(net.containers.is_empty());

        let created = net.created.expect("timestamp parsed");
        assert_eq!(created.to_rfc3339(), "2026-02-01T10:30:00+00:00");
    }

    #[test]
    fn conversion_sorts_attached_containers() {
        let attached = HashMap::from([
            ("c-zulu".to_string(), models::NetworkContainer::default()),
            ("c-alpha".to_string(), models::NetworkContainer::default()),
        ]);
        let daemon_net = models::Network {
            id: Some("net-123".to_string()),
            name: Some("svc-net".to_string()),
            containers: Some(attached),
            ..Default::default()
        };

        let net = network_from_daemon(daemon_net);
        assert_eq!(net.containers, vec!["c-alpha", "c-zulu"]);
    }

    #[test]
    fn conversion_drops_absent_addressing_plan() {
        let daemon_net = models::Network {
            id: Some("net-123".to_string()),
            name: Some("svc-net".to_string()),
            ipam: Some(models::Ipam::default()),
            ..Default::default()
        };
        assert!(network_from_daemon(daemon_net).ipam.is_none());
    }

    #[test]
    fn conversion_keeps_addressing_plan() {
        let daemon_net = models::Network {
            id: Some("net-123".to_string()),
            name: Some("svc-net".to_string()),
            ipam: Some(models::Ipam {
                driver: Some("default".to_string()),
                config: Some(vec![models::IpamConfig {
                    subnet: Some("172.16.34.0/23".to_string()),
                    gateway: Some("172.16.34.1".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let ipam = network_from_daemon(daemon_net).ipam.expect("plan kept");
        assert_eq!(ipam.driver, "default");
        assert_eq!(ipam.config[0].subnet, "172.16.34.0/23");
        assert_eq!(ipam.config[0].gateway, "172.16.34.1");
    }

    #[test]
    fn unparseable_created_is_dropped() {
        assert!(parse_created("not-a-timestamp").is_none());
    }
}
