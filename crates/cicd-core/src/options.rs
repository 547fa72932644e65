use crate::WorkflowConfig;

/// Execution toggles consulted by every provider call.
///
/// Built once per invocation and passed by value, so tests can flip
/// `dry_run` without touching shared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Ask external tools for verbose output (e.g. `helm --debug`)
    pub debug: bool,
    /// Skip side effects for push; translate to the tool's own flag for deploy
    pub dry_run: bool,
}

impl RunOptions {
    /// Combine CLI flags with the config file toggles; either source enables a toggle.
    pub fn resolve(debug_flag: bool, dry_run_flag: bool, config: &WorkflowConfig) -> Self {
        Self {
            debug: debug_flag || config.config.debug,
            dry_run: dry_run_flag || config.config.dryrun,
        }
    }

    /// Log prefix for a command line about to run.
    pub fn command_mode(&self) -> &'static str {
        if self.dry_run {
            "would execute:"
        } else {
            "executing:"
        }
    }
}
