//! Container registry providers.
//!
//! The active registry is a borrow into [`WorkflowConfig`], selected by the
//! `config.provider.registry.id` identifier:
//!
//! | id       | variant              | auth                                    | push                        |
//! |----------|----------------------|-----------------------------------------|-----------------------------|
//! | `gcr`    | [`Registry::Gcr`]    | `gcloud auth activate-service-account`  | `gcloud docker -- push`     |
//! | `docker` | [`Registry::Docker`] | `docker login` (env credentials)        | `docker push`               |

mod docker;
mod gcr;

use std::path::PathBuf;

use cicd_core::{DockerConfig, GcrConfig, ImageTag, ProviderKind, RunOptions, WorkflowConfig};

use crate::command::CommandError;
use crate::runner::{CommandRunner, display_command, log_lines, run_unless_dry, split_lines};

/// Active container registry.
#[derive(Debug, Clone, Copy)]
pub enum Registry<'a> {
    Gcr(&'a GcrConfig),
    Docker(&'a DockerConfig),
}

impl<'a> Registry<'a> {
    /// Select the registry named by `config.provider.registry.id`.
    pub fn select(config: &'a WorkflowConfig) -> cicd_core::Result<Self> {
        Self::from_id(config.registry_id(), config)
    }

    pub fn from_id(id: &str, config: &'a WorkflowConfig) -> cicd_core::Result<Self> {
        match id {
            "gcr" => Ok(Self::Gcr(&config.provider.registry.gcr)),
            "docker" => Ok(Self::Docker(&config.provider.registry.docker)),
            other => Err(cicd_core::Error::UnknownProvider {
                kind: ProviderKind::Registry,
                id: other.to_owned(),
            }),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Gcr(_) => "gcr",
            Self::Docker(_) => "docker",
        }
    }

    pub fn description(&self) -> &'a str {
        let description = match *self {
            Self::Gcr(c) => c.description.as_str(),
            Self::Docker(c) => c.description.as_str(),
        };
        if description.is_empty() {
            self.id()
        } else {
            description
        }
    }

    /// Base repository URL images are tagged under.
    pub fn repo_url(&self) -> &'a str {
        match *self {
            Self::Gcr(c) => &c.url,
            Self::Docker(c) => &c.url,
        }
    }

    /// Check the registry has the values required to tag and push.
    pub fn is_valid(&self) -> Result<(), RegistryError> {
        if self.repo_url().is_empty() {
            return Err(RegistryError::MissingUrl {
                description: self.description().to_owned(),
            });
        }
        Ok(())
    }

    /// Log in to the registry with its configured credential material.
    pub async fn authenticate<R: CommandRunner>(
        &self,
        runner: &R,
        options: RunOptions,
    ) -> Result<(), RegistryError> {
        match self {
            Self::Gcr(c) => gcr::authenticate(c, runner, options).await,
            Self::Docker(_) => docker::authenticate(runner, options).await,
        }
    }

    /// Push `images` in order, stopping at the first failure.
    ///
    /// On failure the error carries the images confirmed pushed before the
    /// failing one. In dry-run mode nothing is spawned and every image is
    /// reported as pushed.
    pub async fn push<R: CommandRunner>(
        &self,
        runner: &R,
        options: RunOptions,
        images: &[ImageTag],
    ) -> Result<Vec<ImageTag>, PushError> {
        let mut pushed = Vec::with_capacity(images.len());

        for image in images {
            let (program, args) = self.push_command(image);
            let shown = display_command(program, &args);

            let output = match run_unless_dry(runner, options, program, &args, &shown).await {
                Ok(Some(output)) => output,
                Ok(None) => {
                    pushed.push(image.clone());
                    continue;
                }
                Err(source) => {
                    return Err(PushError {
                        image: image.clone(),
                        pushed,
                        source,
                    });
                }
            };

            if !output.success {
                log_lines(&split_lines(&output.stderr));
            }
            match output.require_success(&shown) {
                Ok(output) => log_lines(&output.stdout_lines),
                Err(source) => {
                    return Err(PushError {
                        image: image.clone(),
                        pushed,
                        source,
                    });
                }
            }
            pushed.push(image.clone());
        }

        Ok(pushed)
    }

    fn push_command(&self, image: &ImageTag) -> (&'static str, Vec<String>) {
        match self {
            Self::Gcr(_) => gcr::push_command(image),
            Self::Docker(_) => docker::push_command(image),
        }
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry url missing from {description} configuration")]
    MissingUrl { description: String },

    #[error("gcloud auth key file not configured (provider.registry.gcr.keyfile)")]
    MissingKeyFile,

    #[error("gcloud auth key file {path} is not readable")]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} environment variable not set")]
    MissingEnvVar(String),

    #[error("registry authentication failed")]
    Auth { source: CommandError },
}

impl RegistryError {
    /// Missing or unreadable credential material, as opposed to a tool failure.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::MissingKeyFile | Self::KeyFile { .. } | Self::MissingEnvVar(_)
        )
    }
}

/// Push stopped at `image`; `pushed` lists the images confirmed before it.
#[derive(Debug, thiserror::Error)]
#[error("failed to push {image} (pushed before failure: {})", format_pushed(.pushed))]
pub struct PushError {
    pub image: ImageTag,
    pub pushed: Vec<ImageTag>,
    pub source: CommandError,
}

fn format_pushed(pushed: &[ImageTag]) -> String {
    if pushed.is_empty() {
        "(none)".to_owned()
    } else {
        pushed
            .iter()
            .map(ImageTag::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
