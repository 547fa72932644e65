//! Push and deploy workflows.
//!
//! ```text
//! cicd push
//!   1. Validate     ── image, branch, event kind (+ PR number for pull_request)
//!   2. Registry     ── is_valid() → authenticate()
//!   3. Tags         ── derive_tags_for(repo_url, image, event, branch, pr)
//!   4. Tag locally  ── docker tag <image> <target>   (all before any push)
//!   5. Push         ── registry.push(tags)           (stops at first failure)
//!
//! cicd deploy
//!   1. Validate     ── tag, branch, namespace, chart, repo, service, template
//!   2. Render       ── values template → values file (temp unless configured)
//!   3. Release      ── helm upgrade --install <service>-<branch> ...
//! ```
//!
//! Both workflows are sequential and fail fast. Side-effecting commands go
//! through a [`CommandRunner`](cicd_provider::CommandRunner).

pub mod deploy;
pub mod error;
pub mod push;

pub use deploy::{DeployReport, DeployRequest, run_deploy};
pub use error::{ErrorKind, WorkflowError};
pub use push::{PushReport, PushRequest, run_push};
