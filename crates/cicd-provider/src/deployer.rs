use std::path::{Path, PathBuf};

use cicd_core::config::non_empty;
use cicd_core::{HelmConfig, ProviderKind, RunOptions, WorkflowConfig};

use crate::command::CommandError;
use crate::runner::{CommandRunner, display_command, log_lines, split_lines};

const HELM: &str = "helm";

/// Active release-management provider.
#[derive(Debug, Clone, Copy)]
pub enum Deployer<'a> {
    Helm(&'a HelmConfig),
}

/// Config-file fallbacks a deployer offers for unset deploy arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployDefaults<'a> {
    pub namespace: Option<&'a str>,
    pub chart: Option<&'a Path>,
    pub values_template: Option<&'a Path>,
    pub values_output: Option<&'a Path>,
    pub release: Option<&'a str>,
}

/// Fully resolved release to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSpec {
    pub release: String,
    pub namespace: String,
    pub chart: PathBuf,
    pub values_file: PathBuf,
}

impl<'a> Deployer<'a> {
    /// Select the deployer named by `config.provider.cd.id`.
    pub fn select(config: &'a WorkflowConfig) -> cicd_core::Result<Self> {
        Self::from_id(config.deployer_id(), config)
    }

    pub fn from_id(id: &str, config: &'a WorkflowConfig) -> cicd_core::Result<Self> {
        match id {
            "helm" => Ok(Self::Helm(&config.provider.cd.helm)),
            other => Err(cicd_core::Error::UnknownProvider {
                kind: ProviderKind::Deployer,
                id: other.to_owned(),
            }),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Helm(_) => "helm",
        }
    }

    pub fn defaults(&self) -> DeployDefaults<'a> {
        match *self {
            Self::Helm(helm) => DeployDefaults {
                namespace: helm.namespace.as_deref().and_then(non_empty),
                chart: non_empty_path(helm.chartpath.as_deref()),
                values_template: non_empty_path(helm.values.template.as_deref()),
                values_output: non_empty_path(helm.values.output.as_deref()),
                release: non_empty(&helm.release),
            },
        }
    }

    /// Arguments for the release tool, with run toggles translated into its
    /// own flags.
    pub fn release_args(
        &self,
        spec: &ReleaseSpec,
        options: RunOptions,
    ) -> Result<Vec<String>, DeployError> {
        let values = path_arg(&spec.values_file)?;
        let chart = path_arg(&spec.chart)?;

        match self {
            Self::Helm(helm) => {
                let mut args = vec![
                    "upgrade".to_owned(),
                    "--install".to_owned(),
                    spec.release.clone(),
                    "--namespace".to_owned(),
                    spec.namespace.clone(),
                ];
                if options.debug {
                    args.push("--debug".to_owned());
                }
                if options.dry_run {
                    args.push("--dry-run".to_owned());
                }
                args.extend(helm.extra_args.iter().cloned());
                args.push("--values".to_owned());
                args.push(values);
                args.push(chart);
                Ok(args)
            }
        }
    }

    /// Apply the release. Dry-run is passed through to the tool, which
    /// still runs.
    pub async fn deploy<R: CommandRunner>(
        &self,
        runner: &R,
        options: RunOptions,
        spec: &ReleaseSpec,
    ) -> Result<Vec<String>, DeployError> {
        let program = match self {
            Self::Helm(_) => HELM,
        };
        let args = self.release_args(spec, options)?;
        let shown = display_command(program, &args);
        tracing::info!("executing: {shown}");

        let output = runner
            .run(program, &args)
            .await
            .map_err(|e| DeployError::Release { source: e })?;

        if !output.success {
            for line in split_lines(&output.stderr) {
                tracing::warn!("{line}");
            }
        }
        let output = output
            .require_success(&shown)
            .map_err(|e| DeployError::Release { source: e })?;

        log_lines(&output.stdout_lines);
        Ok(output.stdout_lines)
    }
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn path_arg(path: &Path) -> Result<String, DeployError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| DeployError::InvalidPath(path.to_path_buf()))
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("release failed")]
    Release { source: CommandError },
}
