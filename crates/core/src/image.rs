// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image references and commit targets.

use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author recorded on images committed from agent containers.
pub const COMMIT_AUTHOR: &str = "dockhand";

const DEFAULT_TAG: &str = "latest";

/// Repository plus tag and/or digest, e.g. `alpine:3.18`,
/// `registry:5000/team/agent:v2` or `alpine@sha256:<hex>`.
///
/// At least one of tag and digest is always present: a bare repository
/// gets the `latest` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageName {
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageName {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { repository: repository.into(), tag: Some(tag.into()), digest: None }
    }

    /// Parse a reference. A trailing `@algo:hex` is the digest. In the rest,
    /// the tag is whatever follows the last `:` unless a `/` comes after it
    /// (then the colon belonged to a registry port).
    pub fn parse(reference: &str) -> Result<Self, SpecError> {
        let reference = reference.trim();
        let invalid = || SpecError::InvalidImage(reference.to_string());
        if reference.is_empty() || reference.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) => {
                let valid = matches!(
                    digest.split_once(':'),
                    Some((algo, hex)) if !algo.is_empty() && !hex.is_empty() && !hex.contains(':')
                );
                if !valid {
                    return Err(invalid());
                }
                (name, Some(digest))
            }
            None => (reference, None),
        };

        let (repository, tag) = match name.rfind(':') {
            Some(idx) if !name[idx..].contains('/') => (&name[..idx], Some(&name[idx + 1..])),
            _ => (name, None),
        };
        if repository.is_empty() || repository.ends_with('/') || tag == Some("") {
            return Err(invalid());
        }
        let tag = match (tag, digest) {
            (None, None) => Some(DEFAULT_TAG),
            (tag, _) => tag,
        };
        Ok(Self {
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
            digest: digest.map(str::to_string),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// What to pull alongside the repository: the digest when pinned,
    /// otherwise the tag.
    pub fn pull_tag(&self) -> &str {
        self.digest.as_deref().or(self.tag.as_deref()).unwrap_or(DEFAULT_TAG)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl FromStr for ImageName {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImageName {
    type Error = SpecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ImageName> for String {
    fn from(image: ImageName) -> Self {
        image.to_string()
    }
}

/// Where to persist a container's final filesystem as a new image.
///
/// A digest on the source name is ignored: commits always get a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSpec {
    pub repository: String,
    pub tag: String,
    pub author: String,
}

impl CommitSpec {
    pub fn new(image: &ImageName) -> Self {
        Self {
            repository: image.repository().to_string(),
            tag: image.tag().unwrap_or(DEFAULT_TAG).to_string(),
            author: COMMIT_AUTHOR.to_string(),
        }
    }
}

impl From<ImageName> for CommitSpec {
    fn from(image: ImageName) -> Self {
        Self::new(&image)
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
