//! Route pattern compilation and matching.
//!
//! A pattern is compiled once, at registration, into a segment list:
//! `:name` binds one path segment, a trailing `*` binds the rest.

use std::collections::HashMap;

use crate::error::{AppError, Result};

/// Key under which a trailing wildcard stores the remaining path.
pub const WILDCARD_PARAM: &str = "wildcard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    // == Parse ==
    pub fn parse(source: &str) -> Result<Self> {
        let tokens: Vec<&str> = source.split('/').filter(|t| !t.is_empty()).collect();
        let mut segments = Vec::with_capacity(tokens.len());
        let mut names: Vec<&str> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let segment = if *token == "*" {
                if i + 1 != tokens.len() {
                    return Err(AppError::invalid_pattern(
                        source,
                        "wildcard must be the final segment",
                    ));
                }
                names.push(WILDCARD_PARAM);
                Segment::Wildcard
            } else if let Some(name) = token.strip_prefix(':') {
                if name.is_empty() {
                    return Err(AppError::invalid_pattern(source, "parameter name is empty"));
                }
                names.push(name);
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(token.to_string())
            };
            segments.push(segment);
        }

        if let Some(dup) = first_duplicate(&names) {
            return Err(AppError::invalid_pattern(
                source,
                format!("parameter '{}' is bound twice", dup),
            ));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The pattern as reported in `State::route`: its source without the leading `/`.
    pub fn route_name(&self) -> &str {
        self.source.strip_prefix('/').unwrap_or(&self.source)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `*` on its own: the catch-all tried after every other route.
    pub fn is_fallback(&self) -> bool {
        self.segments == [Segment::Wildcard]
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    // == Match ==
    /// Matches already-split path segments, returning the bound parameters.
    pub fn matches(&self, input: &[&str]) -> Option<HashMap<String, String>> {
        let prefix_len = if self.has_wildcard() {
            self.segments.len() - 1
        } else {
            self.segments.len()
        };

        let length_ok = if self.has_wildcard() {
            input.len() >= prefix_len
        } else {
            input.len() == prefix_len
        };
        if !length_ok {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, value) in self.segments[..prefix_len].iter().zip(input) {
            match segment {
                Segment::Literal(text) if text == value => {}
                Segment::Param(name) if !value.is_empty() => {
                    params.insert(name.clone(), value.to_string());
                }
                _ => return None,
            }
        }

        if self.has_wildcard() {
            params.insert(WILDCARD_PARAM.to_string(), input[prefix_len..].join("/"));
        }

        Some(params)
    }
}

fn first_duplicate<'a>(names: &[&'a str]) -> Option<&'a str> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(*name))
        .map(|(_, name)| *name)
}

/// Splits a path into segments, ignoring leading and trailing slashes.
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}
