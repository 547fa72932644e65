mod common;

use std::path::PathBuf;

use cicd_core::{DockerConfig, GcrConfig, ImageTag, ProviderKind, RunOptions, WorkflowConfig};
use cicd_provider::command::CommandError;
use cicd_provider::registry::{Registry, RegistryError};
use cicd_provider::runner::CommandOutput;
use common::{LogBuffer, MockRunner, block_on, line};
use mockall::Sequence;
use tempfile::NamedTempFile;

const DRY_RUN: RunOptions = RunOptions {
    debug: false,
    dry_run: true,
};

fn gcr(url: &str, keyfile: Option<PathBuf>) -> GcrConfig {
    GcrConfig {
        name: "gcr".to_owned(),
        description: "Google Container Registry".to_owned(),
        host: "gcr.io".to_owned(),
        project: "k8sdemo-159622".to_owned(),
        repo: "gocloud".to_owned(),
        url: url.to_owned(),
        keyfile,
    }
}

fn docker(url: &str) -> DockerConfig {
    DockerConfig {
        name: "docker".to_owned(),
        description: "Docker Hub".to_owned(),
        host: "docker.io".to_owned(),
        account: "marktward".to_owned(),
        repo: "gocloud".to_owned(),
        url: url.to_owned(),
    }
}

fn tags(names: &[&str]) -> Vec<ImageTag> {
    names.iter().map(|n| ImageTag::from(*n)).collect()
}

// ── Selection ──

#[test]
fn select_maps_identifiers_to_variants() {
    let mut config = WorkflowConfig::default();
    config.provider.registry.gcr.url = "gcr.io/p/app".to_owned();
    config.provider.registry.docker.url = "docker.io/a/app".to_owned();

    config.config.provider.registry.id = "gcr".to_owned();
    let registry = Registry::select(&config).unwrap();
    assert!(matches!(registry, Registry::Gcr(_)));
    assert_eq!(registry.repo_url(), "gcr.io/p/app");

    config.config.provider.registry.id = "docker".to_owned();
    let registry = Registry::select(&config).unwrap();
    assert!(matches!(registry, Registry::Docker(_)));
    assert_eq!(registry.repo_url(), "docker.io/a/app");
}

#[test]
fn select_unknown_identifier_fails() {
    let mut config = WorkflowConfig::default();
    config.config.provider.registry.id = "quay".to_owned();

    let err = Registry::select(&config).unwrap_err();
    assert!(matches!(
        err,
        cicd_core::Error::UnknownProvider { kind: ProviderKind::Registry, ref id } if id == "quay"
    ));
    assert!(err.to_string().contains("<quay>"));
}

// ── Validation ──

#[test]
fn empty_url_is_invalid_and_idempotent() {
    let config = gcr("", None);
    let registry = Registry::Gcr(&config);

    for _ in 0..2 {
        let err = registry.is_valid().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingUrl { ref description } if description == "Google Container Registry"
        ));
    }
}

#[test]
fn non_empty_url_is_valid() {
    let config = docker("docker.io/marktward/gocloud");
    let registry = Registry::Docker(&config);
    assert!(registry.is_valid().is_ok());
    assert!(registry.is_valid().is_ok());
}

// ── GCR authentication ──

#[tokio::test]
async fn gcr_auth_without_keyfile_spawns_nothing() {
    let config = gcr("gcr.io/p/app", None);
    let runner = MockRunner::new();

    let err = Registry::Gcr(&config)
        .authenticate(&runner, RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::MissingKeyFile));
    assert!(err.is_credential_error());
}

#[tokio::test]
async fn gcr_auth_with_missing_keyfile_spawns_nothing() {
    let config = gcr("gcr.io/p/app", Some(PathBuf::from("/nonexistent/key.json")));
    let runner = MockRunner::new();

    let err = Registry::Gcr(&config)
        .authenticate(&runner, RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::KeyFile { ref path, .. } if path.ends_with("key.json")));
}

#[tokio::test]
async fn gcr_auth_success_reported_on_stderr() {
    let keyfile = NamedTempFile::new().unwrap();
    let config = gcr("gcr.io/p/app", Some(keyfile.path().to_path_buf()));
    let expected = format!(
        "gcloud auth activate-service-account --key-file {}",
        keyfile.path().display()
    );

    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(move |program, args| line(program, args) == expected)
        .times(1)
        .returning(|_, _| {
            Ok(CommandOutput {
                success: true,
                stdout_lines: vec![],
                stderr: "Activated service account credentials for: [ci@p.iam]\n".to_owned(),
            })
        });

    let logs = LogBuffer::default();
    let _guard = logs.install();

    Registry::Gcr(&config)
        .authenticate(&runner, RunOptions::default())
        .await
        .unwrap();

    assert!(logs.contents().contains("Activated service account credentials"));
}

#[tokio::test]
async fn gcr_auth_failure_carries_stderr() {
    let keyfile = NamedTempFile::new().unwrap();
    let config = gcr("gcr.io/p/app", Some(keyfile.path().to_path_buf()));

    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .times(1)
        .returning(|_, _| Ok(CommandOutput::failed("ERROR: invalid key file\n")));

    let err = Registry::Gcr(&config)
        .authenticate(&runner, RunOptions::default())
        .await
        .unwrap_err();

    match err {
        RegistryError::Auth { source } => {
            assert_eq!(source.stderr(), Some("ERROR: invalid key file"));
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn gcr_auth_with_directory_keyfile_spawns_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = gcr("gcr.io/p/app", Some(dir.path().to_path_buf()));
    let runner = MockRunner::new();

    let err = Registry::Gcr(&config)
        .authenticate(&runner, RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::KeyFile { ref path, .. } if path == dir.path()));
    assert!(err.is_credential_error());
}

#[tokio::test]
async fn gcr_auth_dry_run_still_checks_keyfile() {
    let config = gcr("gcr.io/p/app", Some(PathBuf::from("/nonexistent/key.json")));
    let runner = MockRunner::new();

    let result = Registry::Gcr(&config).authenticate(&runner, DRY_RUN).await;
    assert!(matches!(result, Err(RegistryError::KeyFile { .. })));
}

// ── Docker Hub authentication ──

#[test]
fn docker_auth_requires_user() {
    let config = docker("docker.io/marktward/gocloud");
    let runner = MockRunner::new();

    let result = temp_env::with_vars(
        [("DOCKER_USER", None), ("DOCKER_PASSWORD", Some("secret"))],
        || block_on(Registry::Docker(&config).authenticate(&runner, RunOptions::default())),
    );

    assert!(matches!(result, Err(RegistryError::MissingEnvVar(ref k)) if k == "DOCKER_USER"));
}

#[test]
fn docker_auth_requires_password() {
    let config = docker("docker.io/marktward/gocloud");
    let runner = MockRunner::new();

    let result = temp_env::with_vars(
        [("DOCKER_USER", Some("marktward")), ("DOCKER_PASSWORD", None)],
        || block_on(Registry::Docker(&config).authenticate(&runner, RunOptions::default())),
    );

    let err = result.unwrap_err();
    assert!(err.is_credential_error());
    assert_eq!(err.to_string(), "DOCKER_PASSWORD environment variable not set");
}

#[test]
fn docker_auth_never_logs_password() {
    let config = docker("docker.io/marktward/gocloud");
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(|program, args| line(program, args) == "docker login -u marktward -p s3cr3t-pw")
        .times(1)
        .returning(|_, _| Ok(CommandOutput::ok("Login Succeeded\n")));

    let logs = LogBuffer::default();
    let result = temp_env::with_vars(
        [
            ("DOCKER_USER", Some("marktward")),
            ("DOCKER_PASSWORD", Some("s3cr3t-pw")),
        ],
        || {
            let _guard = logs.install();
            block_on(Registry::Docker(&config).authenticate(&runner, RunOptions::default()))
        },
    );

    assert!(result.is_ok());
    let output = logs.contents();
    assert!(output.contains("docker login -u marktward -p ********"));
    assert!(output.contains("Login Succeeded"));
    assert!(!output.contains("s3cr3t-pw"));
}

#[test]
fn docker_auth_failure_is_tool_error() {
    let config = docker("docker.io/marktward/gocloud");
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .times(1)
        .returning(|_, _| Ok(CommandOutput::failed("unauthorized: incorrect username or password")));

    let result = temp_env::with_vars(
        [
            ("DOCKER_USER", Some("marktward")),
            ("DOCKER_PASSWORD", Some("wrong")),
        ],
        || block_on(Registry::Docker(&config).authenticate(&runner, RunOptions::default())),
    );

    let err = result.unwrap_err();
    assert!(!err.is_credential_error());
    match err {
        RegistryError::Auth { source } => {
            let message = source.to_string();
            assert!(message.contains("-p ********"), "got: {message}");
            assert!(!message.contains("wrong"), "got: {message}");
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
}

// ── Push ──

#[tokio::test]
async fn push_stops_at_first_failure() {
    let config = docker("r");
    let mut runner = MockRunner::new();
    let mut seq = Sequence::new();

    runner
        .expect_run()
        .withf(|program, args| line(program, args) == "docker push r:t1")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CommandOutput::ok("t1: digest: sha256:aaa")));
    runner
        .expect_run()
        .withf(|program, args| line(program, args) == "docker push r:t2")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CommandOutput::failed("denied: requested access to the resource is denied")));
    runner
        .expect_run()
        .withf(|program, args| line(program, args) == "docker push r:t3")
        .never();

    let err = Registry::Docker(&config)
        .push(&runner, RunOptions::default(), &tags(&["r:t1", "r:t2", "r:t3"]))
        .await
        .unwrap_err();

    assert_eq!(err.pushed, vec!["r:t1"]);
    assert_eq!(err.image, "r:t2");
    assert_eq!(
        err.source.stderr(),
        Some("denied: requested access to the resource is denied")
    );
    assert!(err.to_string().contains("r:t2"));
}

#[tokio::test]
async fn push_all_succeed_in_order() {
    let config = gcr("gcr.io/p/app", None);
    let mut runner = MockRunner::new();
    let mut seq = Sequence::new();

    for image in ["gcr.io/p/app:abc", "gcr.io/p/app:master", "gcr.io/p/app:latest"] {
        let expected = format!("gcloud docker -- push {image}");
        runner
            .expect_run()
            .withf(move |program, args| line(program, args) == expected)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(CommandOutput::ok("pushed")));
    }

    let images = tags(&["gcr.io/p/app:abc", "gcr.io/p/app:master", "gcr.io/p/app:latest"]);
    let pushed = Registry::Gcr(&config)
        .push(&runner, RunOptions::default(), &images)
        .await
        .unwrap();

    assert_eq!(pushed, images);
}

#[tokio::test]
async fn push_first_image_spawn_failure_reports_nothing_pushed() {
    let config = gcr("gcr.io/p/app", None);
    let mut runner = MockRunner::new();
    runner.expect_run().times(1).returning(|program, _| {
        Err(CommandError::NotFound {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });

    let err = Registry::Gcr(&config)
        .push(&runner, RunOptions::default(), &tags(&["gcr.io/p/app:abc", "gcr.io/p/app:dev"]))
        .await
        .unwrap_err();

    assert!(err.pushed.is_empty());
    assert_eq!(err.image, "gcr.io/p/app:abc");
    assert!(matches!(err.source, CommandError::NotFound { .. }));
    assert!(err.to_string().contains("(none)"));
}

#[tokio::test]
async fn push_dry_run_spawns_nothing() {
    let config = docker("r");
    let runner = MockRunner::new();
    let images = tags(&["r:t1", "r:t2", "r:t3"]);

    let logs = LogBuffer::default();
    let _guard = logs.install();

    let pushed = Registry::Docker(&config)
        .push(&runner, DRY_RUN, &images)
        .await
        .unwrap();

    assert_eq!(pushed, images);
    let output = logs.contents();
    assert_eq!(output.matches("would execute:").count(), 3);
    for image in &images {
        assert!(output.contains(&format!("would execute: docker push {image}")));
    }
}
