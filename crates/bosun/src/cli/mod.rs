//! CLI command definitions and handlers.

use std::collections::HashMap;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tabled::{Table, Tabled};

use bosun_config::Loader;
use bosun_docker::{
    Client, ClientOptions, DaemonClient, Network, NetworkCreateOptions, NetworkListOptions,
};

/// Label marking networks this CLI owns.
pub const MANAGED_LABEL: &str = "bosun.managed";

/// bosun - bridge local development with container orchestration
#[derive(Parser)]
#[command(name = "bosun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Container daemon host (e.g. unix:///var/run/docker.sock)
    #[arg(long, global = true, env = "DOCKER_HOST", default_value = "")]
    pub host: String,

    /// Container daemon API version (default: negotiate)
    #[arg(long, global = true, default_value = "")]
    pub api_version: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage container networks
    Net {
        /// Network subcommands.
        #[command(subcommand)]
        command: NetCommands,
    },

    /// Hoist the local environment (ensure managed networking)
    Up,

    /// Tear the local environment down
    Down,

    /// Diagnose environment issues
    Doctor,
}

/// Network management subcommands.
#[derive(Subcommand)]
pub enum NetCommands {
    /// Create a network (succeeds if it already exists)
    Create {
        /// Network name
        name: String,

        /// Network driver (default: bridge)
        #[arg(long, default_value = "")]
        driver: String,

        /// Subnet in CIDR notation (e.g. 172.16.34.0/23)
        #[arg(long, default_value = "")]
        subnet: String,

        /// Gateway address
        #[arg(long, default_value = "")]
        gateway: String,

        /// Labels (KEY=VALUE)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Restrict external access
        #[arg(long)]
        internal: bool,

        /// Allow manual container attachment
        #[arg(long)]
        attachable: bool,
    },

    /// Remove a network (succeeds if it is already absent)
    Rm {
        /// Network name
        name: String,
    },

    /// List networks
    Ls {
        /// Filters (KEY=VALUE; keys: name, id, driver, label)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Only display network IDs
        #[arg(short, long)]
        quiet: bool,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Display detailed information on a network
    Inspect {
        /// Network name
        name: String,
    },
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Net { ref command } => match command {
                NetCommands::Create {
                    name,
                    driver,
                    subnet,
                    gateway,
                    labels,
                    internal,
                    attachable,
                } => {
                    let opts = NetworkCreateOptions {
                        driver: driver.clone(),
                        subnet: subnet.clone(),
                        gateway: gateway.clone(),
                        labels: parse_key_values(labels)?,
                        internal: *internal,
                        attachable: *attachable,
                    };

                    let client = self.client().await?;
                    let id = client.network_create(name, opts).await?;
                    client.close().await?;

                    println!("{id}");
                    Ok(())
                }

                NetCommands::Rm { name } => {
                    let client = self.client().await?;
                    client.network_remove(name).await?;
                    client.close().await?;

                    println!("{name}");
                    Ok(())
                }

                NetCommands::Ls {
                    filters,
                    quiet,
                    format,
                } => {
                    let opts = NetworkListOptions {
                        filters: parse_filters(filters)?,
                    };

                    let client = self.client().await?;
                    let networks = client.network_list(opts).await?;
                    client.close().await?;

                    render_networks(&networks, *quiet, format)
                }

                NetCommands::Inspect { name } => {
                    let client = self.client().await?;
                    let network = client.network_inspect(name).await?;
                    client.close().await?;

                    println!("{}", serde_json::to_string_pretty(&network)?);
                    Ok(())
                }
            },

            Commands::Up => {
                let config = Loader::new().load_global()?;
                let net = config.network();

                let opts = NetworkCreateOptions {
                    subnet: net.cidr,
                    labels: HashMap::from([(MANAGED_LABEL.to_string(), "true".to_string())]),
                    ..Default::default()
                };

                let client = self.client().await?;
                let id = client.network_create(&net.name, opts).await?;
                client.close().await?;

                println!("network {} ready ({id})", net.name);
                Ok(())
            }

            Commands::Down => {
                let config = Loader::new().load_global()?;
                let net = config.network();

                let client = self.client().await?;
                client.network_remove(&net.name).await?;
                client.close().await?;

                println!("network {} removed", net.name);
                Ok(())
            }

            Commands::Doctor => self.doctor().await,
        }
    }

    /// Build a daemon client from the global flags.
    async fn client(&self) -> Result<DaemonClient> {
        tracing::debug!(host = %self.host, "connecting to container daemon");
        let mut options = ClientOptions::new().host(self.host.clone());
        if !self.api_version.is_empty() {
            options = options.api_version(self.api_version.clone());
        }
        Ok(DaemonClient::connect(options).await?)
    }

    /// Run environment health checks.
    async fn doctor(&self) -> Result<()> {
        #[derive(Tabled)]
        struct CheckRow {
            #[tabled(rename = "CHECK")]
            check: &'static str,
            #[tabled(rename = "STATUS")]
            status: &'static str,
            #[tabled(rename = "MESSAGE")]
            message: String,
        }

        let mut rows = Vec::new();

        let docker = match self.client().await {
            Ok(client) => {
                let result = client.ping().await.map_err(|err| err.to_string());
                client.close().await?;
                result
            }
            Err(err) => Err(err.to_string()),
        };
        rows.push(match docker {
            Ok(()) => CheckRow {
                check: "docker",
                status: "ok",
                message: "daemon reachable".to_string(),
            },
            Err(message) => CheckRow {
                check: "docker",
                status: "failed",
                message,
            },
        });

        rows.push(match Loader::new().load_global() {
            Ok(config) => CheckRow {
                check: "config",
                status: "ok",
                message: format!("container runtime: {}", config.container),
            },
            Err(err) => CheckRow {
                check: "config",
                status: "failed",
                message: err.to_string(),
            },
        });

        let failed = rows.iter().any(|row| row.status == "failed");
        println!("{}", Table::new(rows));

        if failed {
            return Err(eyre!("one or more health checks failed"));
        }
        Ok(())
    }
}

/// Render a network listing as a table, ids, or JSON.
fn render_networks(networks: &[Network], quiet: bool, format: &str) -> Result<()> {
    if quiet {
        for net in networks {
            println!("{}", net.id);
        }
        return Ok(());
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(networks)?);
            Ok(())
        }
        "table" => {
            if networks.is_empty() {
                println!("No networks found.");
                return Ok(());
            }

            #[derive(Tabled)]
            struct NetworkRow {
                #[tabled(rename = "NETWORK ID")]
                id: String,
                #[tabled(rename = "NAME")]
                name: String,
                #[tabled(rename = "DRIVER")]
                driver: String,
                #[tabled(rename = "SCOPE")]
                scope: String,
            }

            let rows: Vec<NetworkRow> = networks
                .iter()
                .map(|net| NetworkRow {
                    id: short_id(&net.id),
                    name: net.name.clone(),
                    driver: net.driver.clone(),
                    scope: net.scope.clone(),
                })
                .collect();

            println!("{}", Table::new(rows));
            Ok(())
        }
        other => Err(eyre!("unknown output format: {other} (expected table or json)")),
    }
}

/// Truncate a daemon id for table display.
fn short_id(id: &str) -> String {
    id.chars().take(12).collect()
}

/// Parse repeated `KEY=VALUE` arguments into a map.
fn parse_key_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("invalid KEY=VALUE pair: {pair}"))?;
        if key.is_empty() {
            return Err(eyre!("invalid KEY=VALUE pair: {pair}"));
        }
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

/// Parse repeated `KEY=VALUE` filters, collecting repeated keys.
fn parse_filters(pairs: &[String]) -> Result<HashMap<String, Vec<String>>> {
    let mut filters: HashMap<String, Vec<String>> = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("invalid filter: {pair} (expected KEY=VALUE)"))?;
        if key.is_empty() {
            return Err(eyre!("invalid filter: {pair} (expected KEY=VALUE)"));
        }
        filters
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(filters)
}
