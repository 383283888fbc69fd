//! Ant-style path patterns (`/staff/**`, `/**/auth/**`, `/files/*.csv`).
//!
//! - `**` spans any number of whole segments, including none
//! - `*` matches within one segment
//! - `?` matches one character within one segment
//!
//! Patterns compile to anchored regexes once, at startup.

use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("path pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("invalid path pattern {pattern}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_owned()));
        }

        let regex = Regex::new(&to_regex(pattern)).map_err(|source| PatternError::Regex {
            pattern: pattern.to_owned(),
            source,
        })?;

        Ok(Self {
            raw: pattern.to_owned(),
            regex,
        })
    }

    /// Parse a list of patterns, failing on the first bad one.
    pub fn parse_all<I>(patterns: I) -> Result<Vec<Self>, PatternError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        patterns.into_iter().map(|p| Self::parse(p.as_ref())).collect()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn to_regex(pattern: &str) -> String {
    let mut out = String::from("^");

    for segment in pattern.split('/').skip(1) {
        if segment == "**" {
            out.push_str("(?:/[^/]*)*");
            continue;
        }

        out.push('/');
        let mut buf = [0u8; 4];
        for ch in segment.chars() {
            match ch {
                '*' => out.push_str("[^/]*"),
                '?' => out.push_str("[^/]"),
                c => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
            }
        }
    }

    out.push('$');
    out
}
