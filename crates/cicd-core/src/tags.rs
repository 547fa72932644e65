//! Image tag derivation.
//!
//! Every build produces one image reference (e.g. `app:abc123`). The push
//! pipeline re-tags it under the registry's repository URL:
//!
//! ```text
//! event          branch     tags
//! push           feature-x  <repo>:abc123, <repo>:feature-x
//! push           master     <repo>:abc123, <repo>:master, <repo>:latest
//! pull_request   (any)      <repo>:abc123, <repo>:PR-<n>
//! ```
//!
//! The first tag is always the commit tag. Order is significant and is
//! preserved through local tagging and push reporting. Duplicates are kept.

use std::fmt;

use crate::EventKind;

/// Fully qualified image reference: `<repoURL>:<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ImageTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl From<&str> for ImageTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

impl PartialEq<str> for ImageTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ImageTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Derive target tags from a raw event kind string.
///
/// # Errors
///
/// [`Error::InvalidEventKind`](crate::Error::InvalidEventKind) when `event`
/// is neither `push` nor `pull_request`.
///
/// # Examples
///
/// ```
/// use cicd_core::derive_tags;
///
/// let tags = derive_tags("gcr.io/p/app", "app:abc123", "push", "master", "").unwrap();
/// assert_eq!(
///     tags,
///     vec!["gcr.io/p/app:abc123", "gcr.io/p/app:master", "gcr.io/p/app:latest"]
/// );
/// ```
pub fn derive_tags(
    repo_url: &str,
    source_image: &str,
    event: &str,
    branch: &str,
    pr: &str,
) -> crate::Result<Vec<ImageTag>> {
    let event: EventKind = event.parse()?;
    Ok(derive_tags_for(repo_url, source_image, event, branch, pr))
}

/// Derive target tags for an already-validated event kind.
///
/// The commit tag keeps everything from the first `:` of `source_image`;
/// an image without a tag yields the bare `repo_url` as commit tag.
pub fn derive_tags_for(
    repo_url: &str,
    source_image: &str,
    event: EventKind,
    branch: &str,
    pr: &str,
) -> Vec<ImageTag> {
    tracing::debug!(
        repo_url,
        source_image,
        event = %event,
        branch,
        pr,
        "deriving image tags",
    );

    let suffix = source_image
        .find(':')
        .map_or("", |sep| &source_image[sep..]);

    let mut tags = vec![ImageTag(format!("{repo_url}{suffix}"))];

    match event {
        EventKind::Push => {
            tags.push(ImageTag(format!("{repo_url}:{branch}")));
            if branch == "master" {
                tags.push(ImageTag(format!("{repo_url}:latest")));
            }
        }
        EventKind::PullRequest => {
            tags.push(ImageTag(format!("{repo_url}:PR-{pr}")));
        }
    }

    tags
}
