//! Registry and deployer providers for cicd.
//!
//! Every provider drives an external CLI (`gcloud`, `docker`, `helm`)
//! through a [`CommandRunner`], so tests substitute a mock runner and
//! never spawn processes.

pub mod command;
pub mod credentials;
pub mod deployer;
pub mod image;
pub mod registry;
pub mod runner;

pub use command::CommandError;
pub use credentials::DockerCredentials;
pub use deployer::{DeployDefaults, DeployError, Deployer, ReleaseSpec};
pub use image::{TagError, tag_images};
pub use registry::{PushError, Registry, RegistryError};
pub use runner::{CommandOutput, CommandRunner, RealRunner};
