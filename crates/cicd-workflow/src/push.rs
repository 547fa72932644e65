use cicd_core::{EventKind, ImageTag, RunOptions, derive_tags_for};
use cicd_provider::{CommandRunner, Registry, tag_images};

use crate::error::WorkflowError;

/// Inputs of one push run, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PushRequest {
    /// Locally built image, e.g. `app:abc123`
    pub image: String,
    pub branch: String,
    /// `push` or `pull_request`
    pub event: String,
    /// Pull request number, required for `pull_request`
    pub pr: Option<String>,
}

/// Outcome of a successful push run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub tagged: Vec<ImageTag>,
    pub pushed: Vec<ImageTag>,
}

impl PushRequest {
    fn validate(&self) -> Result<EventKind, WorkflowError> {
        if self.image.is_empty() {
            return Err(WorkflowError::validation(
                "build image is required; use --image",
            ));
        }
        if self.branch.is_empty() {
            return Err(WorkflowError::validation(
                "build branch is required; use --branch",
            ));
        }
        if self.event.is_empty() {
            return Err(WorkflowError::validation(
                "event type is required; use --event",
            ));
        }
        let event: EventKind = self.event.parse()?;
        if event == EventKind::PullRequest && self.pr().is_empty() {
            return Err(WorkflowError::validation(
                "event type pull_request requires a PR number; use --pr",
            ));
        }
        Ok(event)
    }

    fn pr(&self) -> &str {
        self.pr.as_deref().unwrap_or_default()
    }
}

/// Validate → authenticate → derive tags → tag locally → push.
///
/// Every step must succeed before the next starts. A push failure carries
/// the images pushed before it (see [`WorkflowError::pushed`]).
#[tracing::instrument(skip_all, fields(registry = registry.id(), image = %request.image))]
pub async fn run_push<R: CommandRunner>(
    registry: Registry<'_>,
    runner: &R,
    options: RunOptions,
    request: &PushRequest,
) -> Result<PushReport, WorkflowError> {
    let event = request.validate()?;

    registry.is_valid()?;
    registry.authenticate(runner, options).await?;

    let tags = derive_tags_for(
        registry.repo_url(),
        &request.image,
        event,
        &request.branch,
        request.pr(),
    );
    if tags.is_empty() {
        return Err(WorkflowError::NoTags);
    }
    tracing::debug!(count = tags.len(), "derived image tags");

    tag_images(runner, options, &request.image, &tags).await?;
    tracing::info!("tagged images: {}", join(&tags));

    let pushed = registry.push(runner, options, &tags).await?;
    tracing::info!("pushed images: {}", join(&pushed));

    Ok(PushReport {
        tagged: tags,
        pushed,
    })
}

fn join(tags: &[ImageTag]) -> String {
    tags.iter()
        .map(ImageTag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
