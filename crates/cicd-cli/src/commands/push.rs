use cicd_core::{RunOptions, WorkflowConfig};
use cicd_provider::{RealRunner, Registry};
use cicd_workflow::{PushRequest, run_push};

/// Tag the built image and push every derived tag to the active registry.
pub async fn push(
    config: &WorkflowConfig,
    options: RunOptions,
    request: &PushRequest,
) -> anyhow::Result<()> {
    let registry = Registry::select(config)?;
    tracing::info!(
        registry = registry.id(),
        "pushing to {}",
        registry.description()
    );

    let report = match run_push(registry, &RealRunner, options, request).await {
        Ok(report) => report,
        Err(e) => {
            super::report_failure("push", &e);
            if !e.pushed().is_empty() {
                println!("Pushed before failure:");
                for image in e.pushed() {
                    println!("  {image}");
                }
            }
            return Err(e.into());
        }
    };

    let verb = if options.dry_run { "Would push" } else { "Pushed" };
    println!("{verb} {} image(s):", report.pushed.len());
    for image in &report.pushed {
        println!("  {image}");
    }
    Ok(())
}
