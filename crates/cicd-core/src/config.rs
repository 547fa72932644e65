use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cicd.yaml";

/// cicd.yaml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Process-wide toggles and active provider selection
    pub config: Settings,
    pub app: AppConfig,
    /// Per-provider settings, keyed by slot then provider
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    pub debug: bool,
    pub dryrun: bool,
    pub provider: ProviderSelection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSelection {
    /// Active registry: `gcr` or `docker`
    pub registry: ProviderId,
    /// Active CD provider: `helm`
    pub cd: ProviderId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderId {
    pub id: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service name, used as the default release base name
    pub name: String,
    /// Source repository (informational)
    pub repo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub registry: RegistryProviders,
    pub cd: CdProviders,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryProviders {
    pub gcr: GcrConfig,
    pub docker: DockerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CdProviders {
    pub helm: HelmConfig,
}

/// Google Container Registry settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GcrConfig {
    pub name: String,
    pub description: String,
    pub host: String,
    pub project: String,
    pub repo: String,
    /// Base image URL, e.g. `gcr.io/my-project/my-app`
    pub url: String,
    /// Service account key file passed to `gcloud auth activate-service-account`
    pub keyfile: Option<PathBuf>,
}

/// Docker Hub settings. Credentials come from `DOCKER_USER` / `DOCKER_PASSWORD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub name: String,
    pub description: String,
    pub host: String,
    pub account: String,
    pub repo: String,
    /// Base image URL, e.g. `docker.io/my-account/my-app`
    pub url: String,
}

/// Helm release settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    pub name: String,
    pub version: String,
    /// Release name override; when empty the release is `<service>-<branch>`
    pub release: String,
    pub namespace: Option<String>,
    pub chartpath: Option<PathBuf>,
    /// Additional flags appended to `helm upgrade` verbatim
    pub extra_args: Vec<String>,
    pub values: HelmValuesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmValuesConfig {
    /// Values template containing `{{.Repo}}` / `{{.Tag}}` placeholders
    pub template: Option<PathBuf>,
    /// Rendered values file; a temporary file is used when unset
    pub output: Option<PathBuf>,
}

impl WorkflowConfig {
    /// Load from a YAML file. Unlike most defaults in this schema, the file
    /// itself is required.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::debug!(
            path = %path.display(),
            registry = %config.config.provider.registry.id,
            cd = %config.config.provider.cd.id,
            "workflow config loaded",
        );
        Ok(config)
    }

    /// Identifier of the active registry provider.
    pub fn registry_id(&self) -> &str {
        &self.config.provider.registry.id
    }

    /// Identifier of the active CD provider.
    pub fn deployer_id(&self) -> &str {
        &self.config.provider.cd.id
    }
}

/// Treat empty strings from YAML the same as absent values.
pub fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
