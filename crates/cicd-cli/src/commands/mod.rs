mod deploy;
mod push;

pub use deploy::deploy;
pub use push::push;

/// Log the failure category before the error is returned to `main`.
fn report_failure(step: &str, err: &cicd_workflow::WorkflowError) {
    tracing::error!(kind = %err.kind(), "{step} failed: {err}");
}
