//! Where the text to type comes from.

use clap::ValueEnum;
use include_dir::{include_dir, Dir, File};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

static SNIPPET_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/snippets");

/// The immutable text a session is typed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    text: String,
    chars: Vec<char>,
}

impl Target {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(Error::EmptyTarget);
        }
        let chars = text.chars().collect();
        Ok(Self { text, chars })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Snippet text as read from disk: unix line endings, no trailing blank lines.
fn normalize(raw: &str) -> String {
    raw.replace("\r\n", "\n").trim_end().to_string()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SnippetLanguage {
    Rust,
    Python,
    Go,
    Javascript,
}

impl SnippetLanguage {
    pub fn extension(&self) -> &'static str {
        match self {
            SnippetLanguage::Rust => "rs",
            SnippetLanguage::Python => "py",
            SnippetLanguage::Go => "go",
            SnippetLanguage::Javascript => "js",
        }
    }
}

pub trait TargetProvider {
    fn next_target(&mut self) -> Result<Target>;
}

/// Text passed on the command line.
#[derive(Debug, Clone)]
pub struct InlineTarget(pub String);

impl TargetProvider for InlineTarget {
    fn next_target(&mut self) -> Result<Target> {
        Target::new(self.0.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TargetProvider for FileTarget {
    fn next_target(&mut self) -> Result<Target> {
        let raw = std::fs::read_to_string(&self.path)?;
        debug!(path = %self.path.display(), "loaded target from file");
        Target::new(normalize(&raw))
    }
}

/// Snippets compiled into the binary, picked at random.
#[derive(Debug, Clone, Default)]
pub struct BundledSnippets {
    language: Option<SnippetLanguage>,
}

impl BundledSnippets {
    pub fn new(language: Option<SnippetLanguage>) -> Self {
        Self { language }
    }

    fn candidates(&self) -> Vec<&'static File<'static>> {
        SNIPPET_DIR
            .files()
            .filter(|f| match self.language {
                Some(lang) => f
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == lang.extension()),
                None => true,
            })
            .collect()
    }

    /// Names of all bundled snippets, sorted.
    pub fn names() -> Vec<String> {
        SNIPPET_DIR
            .files()
            .filter_map(|f| f.path().file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .sorted()
            .collect()
    }
}

impl TargetProvider for BundledSnippets {
    fn next_target(&mut self) -> Result<Target> {
        let candidates = self.candidates();
        let file = candidates
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| {
                Error::SnippetNotFound(
                    self.language
                        .map_or_else(|| "any".to_string(), |l| l.to_string()),
                )
            })?;
        let text = file.contents_utf8().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "snippet is not valid utf-8",
            ))
        })?;
        debug!(snippet = %file.path().display(), "picked bundled snippet");
        Target::new(normalize(text))
    }
}
