//! Runtime values rendering for cicd deployments.
//!
//! # Render pipeline
//!
//! ```text
//! cicd deploy
//!   1. Output   ── ValuesFile::resolve() (configured path or temp file)
//!   2. Render   ── {{.Repo}} / {{.Tag}} → tera → output file
//!   3. Verify   ── read the written file back and log it
//!   4. Release  ── helm upgrade --values <file>
//! ```
//!
//! A temporary output file lives as long as its [`ValuesFile`]; dropping it
//! removes the file.

pub mod values;

pub use values::{RenderError, ValuesFile, normalize_actions, render_values};
