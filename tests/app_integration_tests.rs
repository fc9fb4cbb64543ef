//! Integration Tests for the App
//!
//! Drives routing, state assembly and the instance cache through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mini_choo::{
    events, App, AppConfig, AppError, CacheCapability, Constructor, Html, Instance, InstanceId,
};
use serde_json::{json, Value};

// == Helper Functions ==

fn empty_view() -> mini_choo::Result<Html> {
    Ok(Html::from("<div></div>"))
}

/// Constructor that counts how many times it ran.
fn counting_constructor() -> (Constructor, Arc<AtomicUsize>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let ctor = Constructor::new(move |id, _, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(id.clone())
    });
    (ctor, built)
}

// == Rendering ==

#[test]
fn test_renders_on_the_server() {
    let mut app = App::new();
    app.route("/", |_, _| {
        Ok(Html::new(
            "\n      <p><strong>Hello filthy planet</strong></p>\n    ",
        ))
    })
    .unwrap();

    assert_eq!(
        app.to_string("/").unwrap(),
        "<p><strong>Hello filthy planet</strong></p>"
    );
}

#[test]
fn test_history_and_hash_enabled_by_default() {
    let app = App::new();
    assert!(app.history_enabled());
    assert!(app.hash_enabled());
}

#[test]
fn test_handler_receives_state_and_emit() {
    let mut app = App::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    app.route("/", move |state, emit| {
        counter.fetch_add(1, Ordering::SeqCst);
        assert_eq!(state.href, "/");
        emit.emit("custom", &[]);
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// == Routing ==

#[test]
fn test_default_route() {
    let mut app = App::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    app.route("*", move |state, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        assert!(state.params.is_empty());
        empty_view()
    })
    .unwrap();

    app.to_string("/random").unwrap();
    app.to_string("/random/deeper/path").unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_hash_treated_as_slash_by_default() {
    let mut app = App::new();
    app.route("/account/security", |_, _| Ok(Html::from("security")))
        .unwrap();

    assert_eq!(app.to_string("/account#security").unwrap(), "security");
}

#[test]
fn test_hash_ignored_when_disabled() {
    let mut app = App::with_config(AppConfig::default().hash(false)).unwrap();
    app.route("/account", |_, _| Ok(Html::from("account"))).unwrap();

    assert_eq!(app.to_string("/account#security").unwrap(), "account");
}

#[test]
fn test_route_not_found() {
    let mut app = App::new();
    app.route("/", |_, _| empty_view()).unwrap();

    let err = app.to_string("/nowhere").unwrap_err();
    assert!(matches!(err, AppError::RouteNotFound(_)));
}

#[test]
fn test_malformed_pattern_rejected_at_registration() {
    let mut app = App::new();
    let err = app.route("/*/tail", |_, _| empty_view()).unwrap_err();
    assert!(matches!(err, AppError::InvalidPattern { .. }));
}

#[test]
fn test_changed_literal_does_not_match() {
    let mut app = App::new();
    app.route("/users/:id/posts", |state, _| {
        Ok(Html::new(state.params["id"].clone()))
    })
    .unwrap();

    assert_eq!(app.to_string("/users/7/posts").unwrap(), "7");
    assert!(app.to_string("/users/7/comments").is_err());
}

// == Instance Cache ==

#[test]
fn test_cache_defaults_to_100_instances() {
    let mut app = App::new();
    let (ctor, built) = counting_constructor();

    let handler_ctor = ctor.clone();
    app.route("/", move |state, _| {
        for i in 0..=100 {
            state.cache(&handler_ctor, i, &[])?;
        }
        // 0 was touched first and never again, so it was evicted
        state.cache(&handler_ctor, 0, &[])?;
        // 100 is still cached
        state.cache(&handler_ctor, 100, &[])?;
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 102);
    let stats = app.cache_stats();
    assert_eq!(stats.evictions, 2);
    assert_eq!(stats.total_entries, 100);
}

#[test]
fn test_cache_option_overrides_max_instances() {
    let mut app = App::with_config(AppConfig::default().cache_capacity(1)).unwrap();
    let (ctor, built) = counting_constructor();

    let handler_ctor = ctor.clone();
    app.route("/", move |state, _| {
        state.cache(&handler_ctor, 0, &[])?;
        state.cache(&handler_ctor, 0, &[])?;
        state.cache(&handler_ctor, 1, &[])?;
        state.cache(&handler_ctor, 0, &[])?;
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[test]
fn test_zero_capacity_is_configuration_error() {
    let err = App::with_config(AppConfig::default().cache_capacity(0)).unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
}

#[derive(Clone, Default)]
struct RecordingCache {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CacheCapability for RecordingCache {
    fn get(&mut self, _: &Constructor, _: &InstanceId) -> Option<Instance> {
        self.calls.lock().unwrap().push("get");
        None
    }

    fn set(&mut self, _: &Constructor, _: &InstanceId, _: Instance) {
        self.calls.lock().unwrap().push("set");
    }
}

#[test]
fn test_cache_option_overrides_default_lru() {
    let recording = RecordingCache::default();
    let mut app =
        App::with_config(AppConfig::default().cache_backend(recording.clone())).unwrap();
    let (ctor, _) = counting_constructor();

    app.route("/", move |state, _| {
        state.cache(&ctor, "foo", &[])?;
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();

    assert_eq!(*recording.calls.lock().unwrap(), vec!["get", "set"]);
    assert_eq!(app.cache_stats().evictions, 0);
}

/// Backend that already holds one instance and returns it for every key.
#[derive(Clone)]
struct PrefilledCache {
    stored: Instance,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl CacheCapability for PrefilledCache {
    fn get(&mut self, _: &Constructor, _: &InstanceId) -> Option<Instance> {
        self.calls.lock().unwrap().push("get");
        Some(self.stored.clone())
    }

    fn set(&mut self, _: &Constructor, _: &InstanceId, _: Instance) {
        self.calls.lock().unwrap().push("set");
    }
}

#[test]
fn test_custom_backend_hit_skips_construction() {
    let stored: Instance = Arc::new(String::from("from backend"));
    let backend = PrefilledCache {
        stored: stored.clone(),
        calls: Arc::default(),
    };
    let mut app = App::with_config(AppConfig::default().cache_backend(backend.clone())).unwrap();
    let (ctor, built) = counting_constructor();
    let returned = Arc::new(Mutex::new(None));

    let sink = returned.clone();
    app.route("/", move |state, _| {
        *sink.lock().unwrap() = Some(state.cache(&ctor, "foo", &[json!("ignored")])?);
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();

    let returned = returned.lock().unwrap().clone().unwrap();
    assert!(Arc::ptr_eq(&returned, &stored));
    assert_eq!(built.load(Ordering::SeqCst), 0);
    assert_eq!(*backend.calls.lock().unwrap(), vec!["get"]);
    assert_eq!(app.cache_stats().hits, 1);
    assert_eq!(app.cache_stats().constructions, 0);
}

#[test]
fn test_construction_failure_propagates() {
    let mut app = App::new();
    let ctor = Constructor::new(|_, _, _, _| -> anyhow::Result<()> {
        anyhow::bail!("widget exploded")
    });

    app.route("/", move |state, _| {
        state.cache(&ctor, 1, &[])?;
        empty_view()
    })
    .unwrap();

    let err = app.to_string("/").unwrap_err();
    assert!(err.to_string().contains("widget exploded"));
    assert_eq!(app.cache_stats().total_entries, 0);
}

// == Built-in State ==

#[test]
fn test_state_includes_events() {
    let mut app = App::new();
    app.route("/", |state, _| {
        assert!(!state.events.is_empty());
        assert!(state.events.contains(events::DOM_TITLE_CHANGE));
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();
}

#[test]
fn test_state_includes_location() {
    let mut app = App::new();
    app.route("/:first/:second/*", |state, _| {
        assert_eq!(state.href, "/foo/bar/file.txt");
        assert_eq!(state.route, ":first/:second/*");
        assert_eq!(state.params.len(), 3);
        assert_eq!(state.params["first"], "foo");
        assert_eq!(state.params["second"], "bar");
        assert_eq!(state.params["wildcard"], "file.txt");
        assert_eq!(state.query.len(), 1);
        assert_eq!(state.query["bin"], "baz");
        Ok(Html::from("ok"))
    })
    .unwrap();

    assert_eq!(app.to_string("/foo/bar/file.txt?bin=baz").unwrap(), "ok");
}

#[test]
fn test_fragment_after_query_belongs_to_query() {
    let mut app = App::new();
    app.route("/a", |state, _| {
        Ok(Html::new(format!("{}|{}", state.href, state.query["x"])))
    })
    .unwrap();

    assert_eq!(app.to_string("/a?x=1#b").unwrap(), "/a|1#b");
}

#[test]
fn test_state_includes_cache() {
    let mut app = App::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let ctor = Constructor::new(move |id, state, _emit, args| {
        sink.lock()
            .unwrap()
            .push((id.clone(), state.href.clone(), args.to_vec()));
        Ok(())
    });

    app.route("/", move |state, _| {
        let cached = state.cache(&ctor, "foo", &[json!("arg")])?;
        let again = state.cache(&ctor, "foo", &[])?;
        assert!(Arc::ptr_eq(&cached, &again));
        empty_view()
    })
    .unwrap();

    app.to_string("/").unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "consecutive calls return the same instance");
    let (id, href, args) = &seen[0];
    assert_eq!(*id, InstanceId::from("foo"));
    assert_eq!(href, "/");
    assert_eq!(*args, vec![json!("arg")]);
}

#[test]
fn test_cache_survives_navigations() {
    let mut app = App::new();
    let (ctor, built) = counting_constructor();

    app.route("/:page", move |state, _| {
        state.cache(&ctor, "shared", &[])?;
        empty_view()
    })
    .unwrap();

    app.to_string("/one").unwrap();
    app.to_string("/two").unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert_eq!(app.cache_stats().hits, 1);
}

#[test]
fn test_shared_fields_persist_across_navigations() {
    let mut app = App::with_config(AppConfig::default().with_field("visits", 0)).unwrap();
    app.route("/", |state, _| {
        let visits = state.shared().get("visits").and_then(|v| v.as_u64()).unwrap_or(0);
        state.shared().set("visits", visits + 1);
        Ok(Html::new(visits.to_string()))
    })
    .unwrap();

    assert_eq!(app.to_string("/").unwrap(), "0");
    assert_eq!(app.to_string("/").unwrap(), "1");
    assert_eq!(app.shared().get("visits"), Some(Value::from(2)));
}

// == Start / History ==

#[test]
fn test_start_and_push_state() {
    let mut app = App::new();
    app.route("/", |_, _| Ok(Html::from("<p>home</p>"))).unwrap();
    app.route("/about", |_, _| Ok(Html::from("<p>about</p>"))).unwrap();

    let navigations = Arc::new(AtomicUsize::new(0));
    let counter = navigations.clone();
    app.emitter()
        .on(events::NAVIGATE, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    app.start("/").unwrap();
    assert_eq!(app.renderer().mounted("body"), Some(Html::from("<p>home</p>")));
    assert!(!app.sync_location().unwrap());

    app.emit(events::PUSH_STATE, &[json!("/about")]);
    assert!(app.sync_location().unwrap());
    assert_eq!(app.renderer().mounted("body"), Some(Html::from("<p>about</p>")));
    assert_eq!(app.location(), Some("/about".to_string()));

    app.emit(events::POP_STATE, &[]);
    assert!(app.sync_location().unwrap());
    assert_eq!(app.renderer().mounted("body"), Some(Html::from("<p>home</p>")));
    assert_eq!(app.history(), vec!["/", "/about"]);
    assert_eq!(navigations.load(Ordering::SeqCst), 2);
}

#[test]
fn test_replace_state_from_handler() {
    let mut app = App::new();
    app.route("/old", |_, emit| {
        emit.emit(events::REPLACE_STATE, &[json!("/new")]);
        Ok(Html::from("old"))
    })
    .unwrap();
    app.route("/new", |_, _| Ok(Html::from("new"))).unwrap();

    app.start("/old").unwrap();
    assert!(app.sync_location().unwrap());

    assert_eq!(app.renderer().mounted("body"), Some(Html::from("new")));
    assert_eq!(app.history(), vec!["/new"]);
}

#[test]
fn test_dom_content_loaded_fires_once() {
    let mut app = App::new();
    app.route("/", |_, _| empty_view()).unwrap();

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    app.emitter().on(events::DOM_CONTENT_LOADED, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    app.start("/").unwrap();
    app.start("/").unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}
