#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("`{program}` is required but not available on your system, please install it")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to spawn `{program}`")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed\n{stderr}")]
    Failed { command: String, stderr: String },
}

impl CommandError {
    /// Captured diagnostics of a failed command, if it ran at all.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            Self::NotFound { .. } | Self::Spawn { .. } => None,
        }
    }
}
