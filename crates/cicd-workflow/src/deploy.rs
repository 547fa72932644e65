use std::path::{Path, PathBuf};

use cicd_core::RunOptions;
use cicd_core::WorkflowConfig;
use cicd_core::config::non_empty;
use cicd_provider::{CommandRunner, Deployer, Registry, ReleaseSpec};
use cicd_render::{ValuesFile, render_values};

use crate::error::WorkflowError;

/// Inputs of one deploy run. Unset optional fields fall back to config.
#[derive(Debug, Clone, Default)]
pub struct DeployRequest {
    pub branch: String,
    /// Image tag to deploy (required)
    pub tag: String,
    /// Container repository URL; defaults to the active registry URL
    pub repo: Option<String>,
    pub namespace: Option<String>,
    /// Service name; defaults to `app.name`
    pub service: Option<String>,
    pub chart: Option<PathBuf>,
    pub values_template: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub release: String,
    pub namespace: String,
    /// Release tool output
    pub output: Vec<String>,
}

/// Request with every fallback applied and every path checked.
#[derive(Debug)]
struct Resolved<'a> {
    release: String,
    namespace: &'a str,
    chart: &'a Path,
    repo: &'a str,
    tag: &'a str,
    template: &'a Path,
    output: Option<&'a Path>,
}

fn resolve<'a>(
    config: &'a WorkflowConfig,
    registry: Registry<'a>,
    deployer: Deployer<'a>,
    request: &'a DeployRequest,
) -> Result<Resolved<'a>, WorkflowError> {
    let defaults = deployer.defaults();

    let tag = non_empty(&request.tag)
        .ok_or_else(|| WorkflowError::validation("build tag is required; use --tag"))?;
    let branch = non_empty(&request.branch)
        .ok_or_else(|| WorkflowError::validation("branch is required; use --branch"))?;

    let namespace = request
        .namespace
        .as_deref()
        .and_then(non_empty)
        .or(defaults.namespace)
        .ok_or_else(|| {
            WorkflowError::validation("namespace required when not defined in config")
        })?;

    let chart = optional_path(request.chart.as_deref())
        .or(defaults.chart)
        .ok_or_else(|| {
            WorkflowError::validation("chart path required when not defined in config")
        })?;
    if !chart.exists() {
        return Err(WorkflowError::validation(format!(
            "chart path invalid: {}",
            chart.display()
        )));
    }

    let repo = request
        .repo
        .as_deref()
        .and_then(non_empty)
        .or_else(|| non_empty(registry.repo_url()))
        .ok_or_else(|| {
            WorkflowError::validation("repository url required when not defined in config")
        })?;

    let service = request
        .service
        .as_deref()
        .and_then(non_empty)
        .or_else(|| non_empty(&config.app.name))
        .ok_or_else(|| {
            WorkflowError::validation("service name required when not defined in config")
        })?;

    let template = optional_path(request.values_template.as_deref())
        .or(defaults.values_template)
        .ok_or_else(|| {
            WorkflowError::validation("values template required when not defined in config")
        })?;
    if !template.is_file() {
        return Err(WorkflowError::validation(format!(
            "values template invalid: {}",
            template.display()
        )));
    }

    let release = match defaults.release {
        Some(release) => release.to_owned(),
        None => format!("{service}-{branch}"),
    };

    Ok(Resolved {
        release,
        namespace,
        chart,
        repo,
        tag,
        template,
        output: defaults.values_output,
    })
}

fn optional_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Validate → render values → release.
///
/// Nothing is spawned until every input is resolved and both the chart and
/// the values template exist. A temporary values file is removed before
/// this returns, on success and on every error.
pub async fn run_deploy<R: CommandRunner>(
    config: &WorkflowConfig,
    registry: Registry<'_>,
    deployer: Deployer<'_>,
    runner: &R,
    options: RunOptions,
    request: &DeployRequest,
) -> Result<DeployReport, WorkflowError> {
    let resolved = resolve(config, registry, deployer, request)?;
    tracing::debug!(?resolved, "deploy inputs resolved");

    let values = ValuesFile::resolve(resolved.output)?;
    render_values(resolved.template, &values, resolved.repo, resolved.tag)?;

    let spec = ReleaseSpec {
        release: resolved.release,
        namespace: resolved.namespace.to_owned(),
        chart: resolved.chart.to_path_buf(),
        values_file: values.path().to_path_buf(),
    };
    let output = deployer.deploy(runner, options, &spec).await?;

    tracing::info!(
        release = %spec.release,
        namespace = %spec.namespace,
        "deployed"
    );
    Ok(DeployReport {
        release: spec.release,
        namespace: spec.namespace,
        output,
    })
}
