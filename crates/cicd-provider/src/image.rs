use cicd_core::{ImageTag, RunOptions};

use crate::command::CommandError;
use crate::runner::{CommandRunner, display_command, log_lines, run_unless_dry, split_lines};

/// Apply every target tag to the locally built `source` image with `docker tag`.
///
/// Stops at the first failure; nothing is pushed by this step.
pub async fn tag_images<R: CommandRunner>(
    runner: &R,
    options: RunOptions,
    source: &str,
    targets: &[ImageTag],
) -> Result<(), TagError> {
    for target in targets {
        let args = vec!["tag".to_owned(), source.to_owned(), target.to_string()];
        let shown = display_command("docker", &args);

        let output = run_unless_dry(runner, options, "docker", &args, &shown)
            .await
            .map_err(|e| TagError {
                source_image: source.to_owned(),
                target: target.clone(),
                source: e,
            })?;

        if let Some(output) = output {
            if !output.success {
                log_lines(&split_lines(&output.stderr));
            }
            output.require_success(&shown).map_err(|e| TagError {
                source_image: source.to_owned(),
                target: target.clone(),
                source: e,
            })?;
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("failed to tag {source_image} as {target}")]
pub struct TagError {
    pub source_image: String,
    pub target: ImageTag,
    pub source: CommandError,
}
