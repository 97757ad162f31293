//! Loading and validation of configuration files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use bosun_common::BosunPaths;
use bosun_common::paths::PROJECT_FILE_NAME;

use crate::types::{Config, Project, is_valid_name};

/// Errors from loading or validating configuration.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    #[diagnostic(code(bosun::config::read))]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid YAML.
    #[error("failed to parse {}: {source}", path.display())]
    #[diagnostic(code(bosun::config::parse))]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// The parser failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration file violates the schema's business rules.
    #[error("invalid configuration in {}: {}", path.display(), problems.join("; "))]
    #[diagnostic(code(bosun::config::invalid))]
    Invalid {
        /// File the problems were found in.
        path: PathBuf,
        /// One entry per violated rule.
        problems: Vec<String>,
    },

    /// No project file was found walking up from the start directory.
    #[error("no {PROJECT_FILE_NAME} found (searched from {} upward)", start.display())]
    #[diagnostic(
        code(bosun::config::project_not_found),
        help("Run inside a project directory, or create a bosun.yaml")
    )]
    ProjectNotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// Failure determining standard paths.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Common(#[from] bosun_common::BosunError),
}

/// Loads and validates configuration files.
#[derive(Debug, Default)]
pub struct Loader {
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Loader {
    /// Loader using the standard global and project locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the global config path.
    #[must_use]
    pub fn with_global_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_path = Some(path.into());
        self
    }

    /// Override the project config path.
    #[must_use]
    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    /// Path the global configuration is loaded from.
    ///
    /// # Errors
    ///
    /// Returns an error when no config directory can be determined.
    pub fn global_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.global_path {
            return Ok(path.clone());
        }
        Ok(BosunPaths::new()?.global_config())
    }

    /// Load global configuration, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read, parsed
    /// or validated.
    pub fn load_global(&self) -> Result<Config, ConfigError> {
        let path = self.global_path()?;

        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no global config, using defaults");
                return Ok(Config::default());
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    path,
                    source: err,
                });
            }
        };

        let cfg: Config = serde_yaml::from_str(&data).map_err(|err| ConfigError::Parse {
            path: path.clone(),
            source: err,
        })?;

        validate_config(&cfg, &path)?;
        Ok(cfg)
    }

    /// Load project configuration, discovering `bosun.yaml` by walking
    /// up from the working directory unless a path was set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProjectNotFound`] when no project file
    /// exists, or an error when it cannot be read, parsed or validated.
    pub fn load_project(&self) -> Result<Project, ConfigError> {
        let path = match &self.project_path {
            Some(path) => path.clone(),
            None => {
                let start = std::env::current_dir().map_err(bosun_common::BosunError::Io)?;
                find_project_file(&start)?
            }
        };

        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::ProjectNotFound { start: path });
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    path,
                    source: err,
                });
            }
        };

        let proj: Project = serde_yaml::from_str(&data).map_err(|err| ConfigError::Parse {
            path: path.clone(),
            source: err,
        })?;

        validate_project(&proj, &path)?;
        Ok(proj)
    }
}

/// Search for the project file from `start` up to the filesystem root.
fn find_project_file(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut dir = start;
    loop {
        let candidate = dir.join(PROJECT_FILE_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => {
                return Err(ConfigError::ProjectNotFound {
                    start: start.to_path_buf(),
                });
            }
        }
    }
}

const VALID_CONTAINERS: &[&str] = &["colima", "docker", "nerdctl", "podman"];
const VALID_HOSTS_MODES: &[&str] = &["etc", "kubedns"];
const VALID_CLUSTER_PROVIDERS: &[&str] = &["compose", "k8s"];

fn validate_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if cfg.container.is_empty() {
        problems.push("container is required".to_string());
    } else if !VALID_CONTAINERS.contains(&cfg.container.as_str()) {
        problems.push(format!(
            "container must be one of: colima, docker, nerdctl, podman (got {:?})",
            cfg.container
        ));
    }

    if let Some(hosts) = &cfg.hosts {
        if !hosts.mode.is_empty() && !VALID_HOSTS_MODES.contains(&hosts.mode.as_str()) {
            problems.push(format!(
                "hosts.mode must be one of: etc, kubedns (got {:?})",
                hosts.mode
            ));
        }
    }

    for (name, cluster) in &cfg.clusters {
        if cluster.provider.is_empty() {
            problems.push(format!("clusters.{name}.provider is required"));
        } else if !VALID_CLUSTER_PROVIDERS.contains(&cluster.provider.as_str()) {
            problems.push(format!(
                "clusters.{name}.provider must be one of: compose, k8s (got {:?})",
                cluster.provider
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            problems,
        })
    }
}

fn validate_project(proj: &Project, path: &Path) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if proj.project.is_empty() {
        problems.push("project is required".to_string());
    } else if !is_valid_name(&proj.project) {
        problems.push(format!(
            "project name must match ^[a-z][a-z0-9-]*$ (got {:?})",
            proj.project
        ));
    }

    if proj.environments.is_empty() {
        problems.push("at least one environment is required".to_string());
    }
    for (name, env) in &proj.environments {
        if env.cluster.is_empty() {
            problems.push(format!("environments.{name}.cluster is required"));
        }
    }

    if proj.services.is_empty() {
        problems.push("at least one service is required".to_string());
    }
    let mut seen = HashSet::new();
    for (i, svc) in proj.services.iter().enumerate() {
        if svc.name.is_empty() {
            problems.push(format!("services[{i}].name is required"));
        } else {
            if !seen.insert(svc.name.as_str()) {
                problems.push(format!("duplicate service name: {:?}", svc.name));
            }
            if !is_valid_name(&svc.name) {
                problems.push(format!(
                    "services[{i}].name must match ^[a-z][a-z0-9-]*$ (got {:?})",
                    svc.name
                ));
            }
        }
        if svc.pack.is_empty() {
            problems.push(format!("services[{i}].pack is required"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            problems,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_global_config_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let loader = Loader::new().with_global_path(tmp.path().join("config.yaml"));

        let cfg = loader.load_global().unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn malformed_global_config_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(tmp.path(), "config.yaml", "container: [not, a, string");
        let loader = Loader::new().with_global_path(path);

        assert!(matches!(
            loader.load_global(),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn unknown_container_flavor_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(tmp.path(), "config.yaml", "container: minikube\n");
        let loader = Loader::new().with_global_path(path);

        match loader.load_global() {
            Err(ConfigError::Invalid { problems, .. }) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("minikube"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn global_config_parses_network_section() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "config.yaml",
            "container: docker\nnetwork:\n  name: dev-net\n  cidr: 10.1.0.0/16\n",
        );
        let loader = Loader::new().with_global_path(path);

        let cfg = loader.load_global().unwrap();
        assert_eq!(cfg.network().name, "dev-net");
        assert_eq!(cfg.network().cidr, "10.1.0.0/16");
    }

    #[test]
    fn project_file_discovered_in_parent() {
        let tmp = tempfile::TempDir::new().unwrap();
        write(
            tmp.path(),
            PROJECT_FILE_NAME,
            "project: shop\nenvironments:\n  dev:\n    cluster: local\nservices:\n  - name: api\n    pack: rust-service\n",
        );
        let nested = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_project_file(&nested).unwrap();
        assert_eq!(found, tmp.path().join(PROJECT_FILE_NAME));
    }

    #[test]
    fn project_validation_reports_all_problems() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            PROJECT_FILE_NAME,
            "project: Shop\nservices:\n  - name: api\n    pack: \"\"\n",
        );
        let loader = Loader::new().with_project_path(path);

        match loader.load_project() {
            Err(ConfigError::Invalid { problems, .. }) => {
                assert!(problems.iter().any(|p| p.contains("project name")));
                assert!(problems.iter().any(|p| p.contains("environment")));
                assert!(problems.iter().any(|p| p.contains("pack")));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn valid_project_loads() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            PROJECT_FILE_NAME,
            "project: shop\nenvironments:\n  dev:\n    cluster: local\nservices:\n  - name: api\n    pack: rust-service\n  - name: db\n    pack: postgres\n",
        );
        let loader = Loader::new().with_project_path(path);

        let proj = loader.load_project().unwrap();
        assert_eq!(proj.project, "shop");
        assert_eq!(proj.services.len(), 2);
    }
}
