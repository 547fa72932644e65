//! Core types and configuration for cicd.
//!
//! This crate defines the `cicd.yaml` schema ([`WorkflowConfig`]), the
//! per-run execution toggles ([`RunOptions`]), build event kinds, and
//! image tag derivation ([`derive_tags`]).

pub mod config;
pub mod error;
pub mod event;
pub mod options;
pub mod tags;

pub use config::{
    AppConfig, DockerConfig, GcrConfig, HelmConfig, HelmValuesConfig, WorkflowConfig,
};
pub use error::{Error, ProviderKind, Result};
pub use event::EventKind;
pub use options::RunOptions;
pub use tags::{ImageTag, derive_tags, derive_tags_for};
