//! App Module
//!
//! Owns the route table, emitter, shared fields and instance cache, and
//! drives a navigation: location -> route -> state -> handler -> renderer.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheHandle, CacheStats, InstanceCache, DEFAULT_MAX_INSTANCES};
use crate::config::AppConfig;
use crate::emitter::{events, Emitter};
use crate::error::Result;
use crate::render::{HtmlRenderer, Renderer};
use crate::router::{Location, Router};
use crate::state::{self, SharedFields, State, TITLE_FIELD};

/// Selector `start` mounts into until `mount` says otherwise.
pub const DEFAULT_SELECTOR: &str = "body";

type Handler<T> = Box<dyn Fn(&mut State, &Emitter) -> Result<T> + Send + Sync>;

// == History ==
/// In-memory navigation history driven by the history events.
///
/// `mounted` is the path of the view currently attached, tracked even when
/// history is disabled so that `render` can redraw it.
#[derive(Debug, Default)]
struct History {
    entries: Vec<String>,
    index: usize,
    pending: Option<String>,
    mounted: Option<String>,
}

impl History {
    /// Makes `href` the current entry without scheduling a navigation.
    fn record(&mut self, href: &str) {
        match self.entries.get_mut(self.index) {
            Some(current) => *current = href.to_string(),
            None => {
                self.entries.push(href.to_string());
                self.index = self.entries.len() - 1;
            }
        }
    }

    fn push(&mut self, href: &str) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(href.to_string());
        self.index = self.entries.len() - 1;
        self.pending = Some(href.to_string());
    }

    fn replace(&mut self, href: &str) {
        self.record(href);
        self.pending = Some(href.to_string());
    }

    fn back(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.pending = Some(self.entries[self.index].clone());
        }
    }

    /// Schedules the mounted view to be drawn again.
    fn rerender(&mut self) {
        if let Some(path) = &self.mounted {
            self.pending = Some(path.clone());
        }
    }

    fn current(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }
}

/// Normalised form of `path` kept in history: the routable href, plus the
/// raw query when there is one.
fn history_entry(path: &str, hash: bool) -> String {
    let href = Location::parse(path, hash).href;
    match path.split_once('?') {
        Some((_, query)) if !query.is_empty() => format!("{}?{}", href, query),
        _ => href,
    }
}

// == App ==
/// A routed view application.
pub struct App<R: Renderer = HtmlRenderer> {
    router: Router<Handler<R::Tree>>,
    cache: CacheHandle,
    emitter: Emitter,
    shared: SharedFields,
    renderer: R,
    hash: bool,
    history_enabled: bool,
    selector: String,
    history: Arc<Mutex<History>>,
    history_installed: AtomicBool,
    render_installed: AtomicBool,
    loaded: AtomicBool,
}

impl App<HtmlRenderer> {
    /// Creates an app with the default configuration and renderer.
    pub fn new() -> Self {
        let cache = CacheHandle::new(InstanceCache::new(DEFAULT_MAX_INSTANCES));
        Self::assemble(cache, AppConfig::default(), HtmlRenderer::new())
    }

    /// Creates an app with the default renderer.
    ///
    /// Fails with a configuration error if the cache option is unusable.
    pub fn with_config(config: AppConfig) -> Result<Self> {
        Self::with_renderer(config, HtmlRenderer::new())
    }
}

impl Default for App<HtmlRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Renderer> App<R> {
    pub fn with_renderer(mut config: AppConfig, renderer: R) -> Result<Self> {
        let option = std::mem::take(&mut config.cache);
        let cache = CacheHandle::from_option(option)?;
        Ok(Self::assemble(cache, config, renderer))
    }

    fn assemble(cache: CacheHandle, config: AppConfig, renderer: R) -> Self {
        let emitter = Emitter::new();
        let shared = SharedFields::new(config.state);

        let fields = shared.clone();
        emitter.on(events::DOM_TITLE_CHANGE, move |args| {
            if let Some(title) = args.first() {
                fields.set(TITLE_FIELD, title.clone());
            }
        });

        Self {
            router: Router::new(),
            cache,
            emitter,
            shared,
            renderer,
            hash: config.hash,
            history_enabled: config.history,
            selector: DEFAULT_SELECTOR.to_string(),
            history: Arc::new(Mutex::new(History::default())),
            history_installed: AtomicBool::new(false),
            render_installed: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
        }
    }

    // == Route ==
    /// Registers a handler for `pattern`. Malformed patterns are rejected here.
    pub fn route<F>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut State, &Emitter) -> Result<R::Tree> + Send + Sync + 'static,
    {
        self.router.register(pattern, Box::new(handler))
    }

    // == To String ==
    /// Renders `path` and serialises the resulting view.
    pub fn to_string(&self, path: &str) -> Result<String> {
        let tree = self.render(path)?;
        Ok(self.renderer.render_to_string(&tree))
    }

    // == Mount ==
    /// Sets the selector `start` attaches views to.
    pub fn mount(&mut self, selector: impl Into<String>) {
        self.selector = selector.into();
    }

    // == Start ==
    /// Renders `path` and mounts the view at the configured selector.
    ///
    /// Installs the `render` listener (once), which schedules the mounted
    /// view to be drawn again on the next `sync_location`.
    ///
    /// With history enabled this also installs the `pushState`,
    /// `replaceState` and `popState` listeners (once) and records `path` as
    /// the current history entry. Entries hold the normalised href followed by
    /// the query, so `/a/?x=1` is recorded as `/a?x=1`.
    pub fn start(&self, path: &str) -> Result<()> {
        self.install_render();
        let entry = history_entry(path, self.hash);
        if self.history_enabled {
            self.install_history();
            self.lock_history().record(&entry);
        }

        let tree = self.render(path)?;
        self.renderer.mount(&self.selector, tree)?;
        self.lock_history().mounted = Some(entry);
        debug!(path, selector = %self.selector, "Mounted view");

        if !self.loaded.swap(true, Ordering::SeqCst) {
            self.emitter.emit(events::DOM_CONTENT_LOADED, &[]);
        }
        Ok(())
    }

    // == Sync Location ==
    /// Applies a navigation requested through the history events, or a
    /// redraw requested through `render`.
    ///
    /// Returns `false` when nothing was pending.
    pub fn sync_location(&self) -> Result<bool> {
        let pending = self.lock_history().pending.take();
        let Some(path) = pending else {
            return Ok(false);
        };

        let tree = self.render(&path)?;
        self.renderer.mount(&self.selector, tree)?;
        self.lock_history().mounted = Some(path.clone());
        debug!(path = %path, "Navigated");
        self.emitter.emit(events::NAVIGATE, &[Value::from(path)]);
        Ok(true)
    }

    // == Emit ==
    pub fn emit(&self, name: &str, args: &[Value]) {
        self.emitter.emit(name, args);
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn shared(&self) -> &SharedFields {
        &self.shared
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn hash_enabled(&self) -> bool {
        self.hash
    }

    pub fn history_enabled(&self) -> bool {
        self.history_enabled
    }

    /// Current history entry, if `start` has run with history enabled.
    pub fn location(&self) -> Option<String> {
        self.lock_history().current().map(str::to_string)
    }

    pub fn history(&self) -> Vec<String> {
        self.lock_history().entries.clone()
    }

    fn render(&self, path: &str) -> Result<R::Tree> {
        let location = Location::parse(path, self.hash);
        let matched = self.router.find(&location.href)?;
        let mut state = state::build(&matched, location, &self.shared, &self.cache, &self.emitter);

        debug!(href = %state.href, route = %state.route, "Rendering route");
        (matched.route.handler)(&mut state, &self.emitter)
    }

    fn install_history(&self) {
        if self.history_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        let hash = self.hash;
        let history = self.history.clone();
        self.emitter.on(events::PUSH_STATE, move |args| {
            if let Some(href) = args.first().and_then(Value::as_str) {
                lock(&history).push(&history_entry(href, hash));
            }
        });

        let history = self.history.clone();
        self.emitter.on(events::REPLACE_STATE, move |args| {
            if let Some(href) = args.first().and_then(Value::as_str) {
                lock(&history).replace(&history_entry(href, hash));
            }
        });

        let history = self.history.clone();
        self.emitter.on(events::POP_STATE, move |_| lock(&history).back());
    }

    fn install_render(&self) {
        if self.render_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        let history = self.history.clone();
        self.emitter.on(events::RENDER, move |_| lock(&history).rerender());
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        lock(&self.history)
    }
}

fn lock(history: &Mutex<History>) -> MutexGuard<'_, History> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: Renderer> fmt::Debug for App<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.router.len())
            .field("hash", &self.hash)
            .field("history", &self.history_enabled)
            .field("selector", &self.selector)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
