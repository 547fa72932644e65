use cicd_core::{GcrConfig, ImageTag, RunOptions};

use super::RegistryError;
use crate::runner::{CommandRunner, display_command, log_lines, run_unless_dry, split_lines};

const GCLOUD: &str = "gcloud";

pub(super) async fn authenticate<R: CommandRunner>(
    config: &GcrConfig,
    runner: &R,
    options: RunOptions,
) -> Result<(), RegistryError> {
    let keyfile = config
        .keyfile
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(RegistryError::MissingKeyFile)?;

    // Checked before anything is spawned, dry-run included.
    let key_error = |e| RegistryError::KeyFile {
        path: keyfile.to_path_buf(),
        source: e,
    };
    let metadata = std::fs::metadata(keyfile).map_err(key_error)?;
    if !metadata.is_file() {
        return Err(key_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    std::fs::File::open(keyfile).map_err(key_error)?;

    let args = vec![
        "auth".to_owned(),
        "activate-service-account".to_owned(),
        "--key-file".to_owned(),
        keyfile.display().to_string(),
    ];
    let shown = display_command(GCLOUD, &args);

    let Some(output) = run_unless_dry(runner, options, GCLOUD, &args, &shown)
        .await
        .map_err(|e| RegistryError::Auth { source: e })?
    else {
        return Ok(());
    };

    // gcloud reports a successful activation on stderr, so both streams are
    // logged and only the exit status decides the outcome.
    log_lines(&output.stdout_lines);
    log_lines(&split_lines(&output.stderr));

    output
        .require_success(&shown)
        .map(drop)
        .map_err(|e| RegistryError::Auth { source: e })
}

pub(super) fn push_command(image: &ImageTag) -> (&'static str, Vec<String>) {
    (
        GCLOUD,
        vec![
            "docker".to_owned(),
            "--".to_owned(),
            "push".to_owned(),
            image.to_string(),
        ],
    )
}
