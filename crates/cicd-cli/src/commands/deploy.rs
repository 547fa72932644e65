use cicd_core::{RunOptions, WorkflowConfig};
use cicd_provider::{Deployer, RealRunner, Registry};
use cicd_workflow::{DeployRequest, run_deploy};

/// Render runtime values and upgrade the release with the active CD provider.
pub async fn deploy(
    config: &WorkflowConfig,
    options: RunOptions,
    request: &DeployRequest,
) -> anyhow::Result<()> {
    // The registry supplies the default repository URL.
    let registry = Registry::select(config)?;
    let deployer = Deployer::select(config)?;
    tracing::info!(deployer = deployer.id(), registry = registry.id(), "deploying");

    let report = run_deploy(config, registry, deployer, &RealRunner, options, request)
        .await
        .inspect_err(|e| super::report_failure("deploy", e))?;

    let suffix = if options.dry_run { " (dry run)" } else { "" };
    println!(
        "Deployed release {} to namespace {}{suffix}",
        report.release, report.namespace
    );
    Ok(())
}
