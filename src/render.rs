//! Rendering seam
//!
//! The app never inspects the views its handlers return; it hands them to a
//! [`Renderer`], which serialises them or mounts them into a document.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

// == Renderer ==
/// View-rendering capability consumed by the app.
pub trait Renderer: Send + Sync {
    /// View tree produced by route handlers
    type Tree;

    /// Serialises a view to a string.
    fn render_to_string(&self, tree: &Self::Tree) -> String;

    /// Attaches a view at `selector`, replacing what was there.
    fn mount(&self, selector: &str, tree: Self::Tree) -> Result<()>;
}

// == Html ==
/// Pre-rendered markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    pub fn new(markup: impl Into<String>) -> Self {
        Html(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Html {
    fn from(markup: String) -> Self {
        Html(markup)
    }
}

impl From<&str> for Html {
    fn from(markup: &str) -> Self {
        Html(markup.to_string())
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Html Renderer ==
/// Default renderer: markup in, markup out, mounted into an in-memory document.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    document: Mutex<HashMap<String, Html>>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// What is currently mounted at `selector`.
    pub fn mounted(&self, selector: &str) -> Option<Html> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(selector)
            .cloned()
    }
}

impl Renderer for HtmlRenderer {
    type Tree = Html;

    fn render_to_string(&self, tree: &Html) -> String {
        tree.as_str().trim().to_string()
    }

    fn mount(&self, selector: &str, tree: Html) -> Result<()> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(selector.to_string(), tree);
        Ok(())
    }
}
