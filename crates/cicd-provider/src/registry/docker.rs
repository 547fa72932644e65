use cicd_core::{ImageTag, RunOptions};
use secrecy::ExposeSecret;

use super::RegistryError;
use crate::credentials::DockerCredentials;
use crate::runner::{CommandRunner, log_lines, run_unless_dry, split_lines};

const DOCKER: &str = "docker";

pub(super) async fn authenticate<R: CommandRunner>(
    runner: &R,
    options: RunOptions,
) -> Result<(), RegistryError> {
    let creds = DockerCredentials::from_env()?;

    let args = vec![
        "login".to_owned(),
        "-u".to_owned(),
        creds.username.clone(),
        "-p".to_owned(),
        creds.password.expose_secret().to_owned(),
    ];
    let shown = format!("{DOCKER} login -u {} -p ********", creds.username);

    let Some(output) = run_unless_dry(runner, options, DOCKER, &args, &shown)
        .await
        .map_err(|e| RegistryError::Auth { source: e })?
    else {
        return Ok(());
    };

    if output.success {
        log_lines(&output.stdout_lines);
    } else {
        log_lines(&split_lines(&output.stderr));
    }

    output
        .require_success(&shown)
        .map(drop)
        .map_err(|e| RegistryError::Auth { source: e })
}

pub(super) fn push_command(image: &ImageTag) -> (&'static str, Vec<String>) {
    (DOCKER, vec!["push".to_owned(), image.to_string()])
}
