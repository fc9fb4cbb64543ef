//! Router Module
//!
//! Route table lookup for navigation paths.
//!
//! Routes are tried in registration order and the first full match wins;
//! there is no backtracking and no specificity ranking. The bare `*`
//! pattern is kept aside and only consulted once every other route missed.

mod location;
mod pattern;


use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{AppError, Result};

pub use location::{parse_query, Location};
pub use pattern::{split_path, Pattern, Segment, WILDCARD_PARAM};

/// A registered pattern and the handler it dispatches to.
#[derive(Debug)]
pub struct Route<H> {
    pub pattern: Pattern,
    pub handler: H,
}

/// Result of resolving an href against the route table.
#[derive(Debug)]
pub struct Match<'a, H> {
    pub route: &'a Route<H>,
    pub params: HashMap<String, String>,
}

impl<H> Match<'_, H> {
    /// Remaining path captured by a trailing `*`, if the pattern has one.
    pub fn wildcard(&self) -> Option<&str> {
        self.params.get(WILDCARD_PARAM).map(String::as_str)
    }
}

/// Append-only route table.
#[derive(Debug)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
    fallback: Option<Route<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            fallback: None,
        }
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Compiles `pattern` and appends it to the table.
    ///
    /// Registering a second fallback replaces the first.
    pub fn register(&mut self, pattern: &str, handler: H) -> Result<()> {
        let pattern = Pattern::parse(pattern)?;
        let route = Route { pattern, handler };

        if route.pattern.is_fallback() {
            if self.fallback.is_some() {
                warn!(pattern = route.pattern.source(), "Replacing fallback route");
            }
            self.fallback = Some(route);
        } else {
            self.routes.push(route);
        }
        Ok(())
    }

    // == Find ==
    /// Resolves a normalised href (see [`Location`]).
    pub fn find(&self, href: &str) -> Result<Match<'_, H>> {
        let input = split_path(href);

        for route in &self.routes {
            if let Some(params) = route.pattern.matches(&input) {
                debug!(href, pattern = route.pattern.source(), "Route matched");
                return Ok(Match { route, params });
            }
        }

        match &self.fallback {
            Some(route) => {
                debug!(href, "Falling back to catch-all route");
                Ok(Match {
                    route,
                    params: HashMap::new(),
                })
            }
            None => {
                debug!(href, "No route matched");
                Err(AppError::RouteNotFound(href.to_string()))
            }
        }
    }

    /// Number of registered routes, fallback included.
    pub fn len(&self) -> usize {
        self.routes.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
