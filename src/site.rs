//! Demo site served by the binary
//!
//! A handful of routes exercising params, wildcards, queries, the fallback
//! route and cached components.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

use crate::app::App;
use crate::cache::{Constructor, InstanceId};
use crate::config::AppConfig;
use crate::emitter::events;
use crate::error::Result;
use crate::render::Html;

// == Counter Component ==
/// Stateful component counting how often it has been rendered.
#[derive(Debug)]
pub struct Counter {
    id: InstanceId,
    label: String,
    renders: AtomicU64,
}

impl Counter {
    pub fn constructor() -> Constructor {
        Constructor::new(|id, _state, _emit, args| {
            let label = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or("Counter")
                .to_string();
            Ok(Counter {
                id: id.clone(),
                label,
                renders: AtomicU64::new(0),
            })
        })
    }

    pub fn renders(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        let count = self.renders.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            r#"<section id="counter-{}"><h2>{}</h2><p>Rendered {} times</p></section>"#,
            self.id, self.label, count
        )
    }
}

fn page(title: &str, body: &str) -> Html {
    Html::new(format!("<main><h1>{}</h1>{}</main>", title, body))
}

// == Demo App ==
/// Builds the demo app with `config`.
pub fn demo_app(config: AppConfig) -> Result<App> {
    let mut app = App::with_config(config)?;
    let counter = Counter::constructor();

    app.route("/", |state, emit| {
        emit.emit(events::DOM_TITLE_CHANGE, &[json!("Home")]);
        let name = state.query.get("name").map_or("stranger", String::as_str);
        Ok(page("Home", &format!("<p>Hello, {}</p>", name)))
    })?;

    app.route("/about", |_, emit| {
        emit.emit(events::DOM_TITLE_CHANGE, &[json!("About")]);
        Ok(page("About", "<p>A tiny routed view runtime.</p>"))
    })?;

    app.route("/counter/:id", move |state, _| {
        let id = state.params["id"].clone();
        let label = format!("Counter {}", id);
        let component = state.cache_as::<Counter>(&counter, id, &[json!(label)])?;
        Ok(page("Counter", &component.render()))
    })?;

    app.route("/files/*", |state, _| {
        let path = state.params.get("wildcard").cloned().unwrap_or_default();
        Ok(page("Files", &format!("<p>Browsing /{}</p>", path)))
    })?;

    app.route("*", |state, _| {
        Ok(page("Not found", &format!("<p>Nothing at {}</p>", state.href)))
    })?;

    Ok(app)
}
