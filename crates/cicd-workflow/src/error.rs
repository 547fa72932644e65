use std::fmt;

use cicd_provider::{DeployError, PushError, RegistryError, TagError};
use cicd_render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Missing or invalid run input that has no config fallback.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Config(#[from] cicd_core::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("no images to tag")]
    NoTags,

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Push(#[from] PushError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Failure category, independent of which step raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Config,
    Credential,
    ExternalTool,
    Template,
    Io,
    UnknownProvider,
    InvalidEventKind,
    NoTags,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Config => "config",
            Self::Credential => "credential",
            Self::ExternalTool => "external tool",
            Self::Template => "template",
            Self::Io => "io",
            Self::UnknownProvider => "unknown provider",
            Self::InvalidEventKind => "invalid event kind",
            Self::NoTags => "no tags",
        };
        f.write_str(name)
    }
}

impl WorkflowError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Config(e) => match e {
                cicd_core::Error::ConfigLoad { .. } => ErrorKind::Io,
                cicd_core::Error::ConfigParse { .. } => ErrorKind::Config,
                cicd_core::Error::UnknownProvider { .. } => ErrorKind::UnknownProvider,
                cicd_core::Error::InvalidEventKind(_) => ErrorKind::InvalidEventKind,
            },
            Self::Registry(e) if e.is_credential_error() => ErrorKind::Credential,
            Self::Registry(RegistryError::MissingUrl { .. }) => ErrorKind::Config,
            Self::Registry(_) => ErrorKind::ExternalTool,
            Self::NoTags => ErrorKind::NoTags,
            Self::Tag(_) | Self::Push(_) => ErrorKind::ExternalTool,
            Self::Render(RenderError::Template { .. }) => ErrorKind::Template,
            Self::Render(_) => ErrorKind::Io,
            Self::Deploy(DeployError::InvalidPath(_)) => ErrorKind::Validation,
            Self::Deploy(DeployError::Release { .. }) => ErrorKind::ExternalTool,
        }
    }

    /// Images confirmed pushed before a push failure.
    pub fn pushed(&self) -> &[cicd_core::ImageTag] {
        match self {
            Self::Push(e) => &e.pushed,
            _ => &[],
        }
    }
}
