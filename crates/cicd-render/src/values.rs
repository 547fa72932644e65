use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tera::{Context, Tera};

/// Prefix of temporary values files, followed by a random suffix.
const TEMP_PREFIX: &str = "runtime_values.yaml.";

/// `{{.Field}}` actions, with optional inner whitespace and trim markers.
static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(-?)\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*(-?)\}\}")
        .expect("valid action pattern")
});

/// Statement and comment openers, which tera would parse in plain text.
static TAG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[%#]").expect("valid tag pattern"));

/// Where rendered values are written.
#[derive(Debug)]
pub enum ValuesFile {
    /// Path from `provider.cd.helm.values.output`; left in place afterwards.
    Configured(PathBuf),
    /// Uniquely named temp file, removed on drop.
    Temporary(NamedTempFile),
}

impl ValuesFile {
    /// Use the configured output path if there is one, otherwise create a
    /// temp file.
    pub fn resolve(configured: Option<&Path>) -> Result<Self, RenderError> {
        match configured {
            Some(path) => Ok(Self::Configured(path.to_path_buf())),
            None => {
                let file = tempfile::Builder::new()
                    .prefix(TEMP_PREFIX)
                    .tempfile()
                    .map_err(|e| RenderError::TempFile { source: e })?;
                tracing::debug!(path = %file.path().display(), "created temporary values file");
                Ok(Self::Temporary(file))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Configured(path) => path,
            Self::Temporary(file) => file.path(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

/// Rewrite `{{.Field}}` actions into tera's `{{ Field }}` form, keeping
/// trim markers.
///
/// `{%` and `{#` in the surrounding text are literal values content and are
/// emitted as tera string expressions. A stray `{{` is left for tera to
/// reject.
pub fn normalize_actions(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in ACTION.captures_iter(template) {
        let Some(action) = caps.get(0) else { continue };
        let text = &template[last..action.start()];
        // A `{` right before an action would otherwise open a tag with it.
        match text.strip_suffix('{') {
            Some(text) => {
                out.push_str(&escape_text(text));
                out.push_str(r#"{{ "{" }}"#);
            }
            None => out.push_str(&escape_text(text)),
        }
        caps.expand("{{${1} ${2} ${3}}}", &mut out);
        last = action.end();
    }
    out.push_str(&escape_text(&template[last..]));
    out
}

fn escape_text(text: &str) -> Cow<'_, str> {
    TAG_OPEN.replace_all(text, r#"{{ "$0" }}"#)
}

/// Render the values template at `template` with `Repo` and `Tag`, write
/// the result to `output`, then read it back.
///
/// Returns the contents as read back from disk, which are also logged.
pub fn render_values(
    template: &Path,
    output: &ValuesFile,
    repo: &str,
    tag: &str,
) -> Result<String, RenderError> {
    let source = std::fs::read_to_string(template).map_err(|e| RenderError::Read {
        path: template.to_path_buf(),
        source: e,
    })?;

    let mut context = Context::new();
    context.insert("Repo", repo);
    context.insert("Tag", tag);
    tracing::debug!(repo, tag, template = %template.display(), "rendering values");

    let rendered = Tera::default()
        .render_str(&normalize_actions(&source), &context)
        .map_err(|e| RenderError::Template {
            path: template.to_path_buf(),
            source: e,
        })?;

    let path = output.path();
    tracing::info!("helm runtime values file: {}", path.display());
    std::fs::write(path, rendered).map_err(|e| RenderError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    let written = std::fs::read_to_string(path).map_err(|e| RenderError::ReadBack {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!("helm runtime values:\n{written}");
    Ok(written)
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read values template {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render values template {path}")]
    Template { path: PathBuf, source: tera::Error },

    #[error("failed to write values file {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read back values file {path}")]
    ReadBack {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create temporary values file")]
    TempFile { source: std::io::Error },
}
