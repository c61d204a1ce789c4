//! Decides whether a scenario file is tagged with the keyword.
//!
//! Two rules are checked and their reasons accumulate:
//! - the base filename contains the keyword (case-insensitive)
//! - the first `<tag field> : value` / `<tag field> = value` line carries the keyword in its value
//!
//! File content is decoded lossily, so stray non-UTF-8 bytes never stop the
//! content rule. A file that cannot be read at all only loses the content rule.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::ScanConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchReason {
    Filename,
    TagField,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::Filename => f.write_str("filename"),
            MatchReason::TagField => f.write_str("tags"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub is_match: bool,
    pub reasons: BTreeSet<MatchReason>,
}

impl MatchResult {
    fn from_reasons(reasons: BTreeSet<MatchReason>) -> Self {
        MatchResult {
            is_match: !reasons.is_empty(),
            reasons,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    /// Stored lowercased.
    keyword: String,
    tag_pattern: Regex,
}

impl Matcher {
    pub fn new(keyword: &str, tag_field: &str) -> Result<Self, regex::Error> {
        // Value is everything up to the end of the line the field sits on.
        let tag_pattern = Regex::new(&format!(
            r"(?i){}[ \t]*[:=][ \t]*([^\r\n]*)",
            regex::escape(tag_field)
        ))?;
        Ok(Matcher {
            keyword: keyword.to_lowercase(),
            tag_pattern,
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self, regex::Error> {
        Self::new(&config.keyword, &config.tag_field)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn filename_matches(&self, file_name: &str) -> bool {
        file_name.to_lowercase().contains(&self.keyword)
    }

    /// Value of the first tag field line in `content`, if any.
    pub fn tag_value<'a>(&self, content: &'a str) -> Option<&'a str> {
        self.tag_pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }

    pub fn content_matches(&self, content: &str) -> bool {
        self.tag_value(content)
            .map(|value| value.to_lowercase().contains(&self.keyword))
            .unwrap_or(false)
    }

    pub fn evaluate(&self, path: &Path) -> MatchResult {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut reasons = BTreeSet::new();
        if self.filename_matches(&file_name) {
            reasons.insert(MatchReason::Filename);
        }

        match fs::read(path) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                if self.content_matches(&content) {
                    reasons.insert(MatchReason::TagField);
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read file, skipping tag check");
            }
        }

        if !reasons.is_empty() {
            debug!(file = %file_name, ?reasons, "File matched keyword");
        }
        MatchResult::from_reasons(reasons)
    }
}
