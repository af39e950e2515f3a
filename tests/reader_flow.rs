//! End-to-end tests for the reader: feeds served over HTTP by a mock server,
//! loaded through the real fetch/parse path, and driven the way the UI loop
//! drives the app (one background event at a time).

use feedcycle::app::{App, AppEvent, LoadOutcome};
use feedcycle::feed::{FeedSource, FetchError, FetchedEntry, HttpFeedSource};
use feedcycle::registry::{EntryStatus, FeedRegistry, FeedSeed};
use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TECH_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Tech</title>
    <item><guid>t1</guid><title>Compilers are fun</title><link>https://tech.example/1</link><description>&lt;p&gt;Parsing &amp; lowering&lt;/p&gt;</description></item>
    <item><guid>t2</guid><title>Async runtimes</title><link>https://tech.example/2</link></item>
</channel></rss>"#;

const NEWS_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>News</title>
    <item><guid>n1</guid><title>Local election results</title><link>https://news.example/1</link></item>
</channel></rss>"#;

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(server)
        .await;
}

/// Registry of three feeds on `server`: two that serve RSS and one that 500s.
async fn http_app(server: &MockServer) -> (App, mpsc::Receiver<AppEvent>) {
    serve(server, "/tech", TECH_RSS).await;
    serve(server, "/news", NEWS_RSS).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;

    let registry = FeedRegistry::new(vec![
        FeedSeed::new("Tech", format!("{}/tech", server.uri())),
        FeedSeed::new("News", format!("{}/news", server.uri())),
        FeedSeed::new("Broken", format!("{}/broken", server.uri())),
    ])
    .unwrap();
    let source = HttpFeedSource::new(Some(Duration::from_secs(5))).unwrap();
    let (tx, rx) = mpsc::channel(32);
    // Cycling off so only explicit navigation loads feeds
    let app = App::new(registry, Arc::new(source), tx, Duration::ZERO);
    (app, rx)
}

async fn pump(app: &mut App, rx: &mut mpsc::Receiver<AppEvent>) {
    let event = rx.recv().await.unwrap();
    app.handle_event(event);
}

async fn load(app: &mut App, rx: &mut mpsc::Receiver<AppEvent>, index: usize) -> LoadOutcome {
    let (tx, done) = oneshot::channel();
    app.load_feed(index, Some(tx));
    pump(app, rx).await;
    done.await.unwrap()
}

fn titles(app: &App) -> Vec<String> {
    app.view
        .as_ref()
        .unwrap()
        .entries
        .iter()
        .map(|e| e.title.clone())
        .collect()
}

#[tokio::test]
async fn test_startup_shows_first_feed() {
    let server = MockServer::start().await;
    let (mut app, mut rx) = http_app(&server).await;

    assert!(app.view.is_none());
    assert!(!app.menu_visible);

    assert_eq!(load(&mut app, &mut rx, 0).await, LoadOutcome::Loaded);
    let view = app.view.as_ref().unwrap();
    assert_eq!(view.title, "Tech");
    assert_eq!(view.entries.len(), 2);
    assert_eq!(view.entries[0].preview, "Parsing & lowering");
    assert!(view.entries.iter().all(|e| !e.is_read()));
}

#[tokio::test]
async fn test_next_and_previous_wrap_around() {
    let server = MockServer::start().await;
    let (mut app, mut rx) = http_app(&server).await;
    load(&mut app, &mut rx, 0).await;

    app.next();
    pump(&mut app, &mut rx).await;
    assert_eq!(app.nav.current(), 1);
    assert_eq!(titles(&app), vec!["Local election results"]);

    app.previous();
    pump(&mut app, &mut rx).await;
    assert_eq!(app.nav.current(), 0);

    // Back from the first feed lands on the last one, which fails to load,
    // so the cursor and the view stay where they were.
    assert_eq!(app.nav.previous_index(), 2);
    app.previous();
    pump(&mut app, &mut rx).await;
    assert_eq!(app.nav.current(), 0);
    assert_eq!(titles(&app), vec!["Compilers are fun", "Async runtimes"]);

    // A failing next() from the middle leaves the cursor in place too
    load(&mut app, &mut rx, 1).await;
    assert_eq!(app.nav.next_index(), 2);
    app.next();
    pump(&mut app, &mut rx).await;
    assert_eq!(app.nav.current(), 1);
}

#[tokio::test]
async fn test_failed_load_keeps_view_and_fires_completion() {
    let server = MockServer::start().await;
    let (mut app, mut rx) = http_app(&server).await;
    load(&mut app, &mut rx, 1).await;
    let before = app.view.clone();

    assert_eq!(load(&mut app, &mut rx, 2).await, LoadOutcome::Failed);
    assert_eq!(app.view, before);
    assert_eq!(app.nav.current(), 1);
    assert!(app.registry.get(2).unwrap().entries.is_none());
    assert!(app.status_message.is_some());
}

#[tokio::test]
async fn test_read_state_survives_reload_and_navigation() {
    let server = MockServer::start().await;
    let (mut app, mut rx) = http_app(&server).await;
    load(&mut app, &mut rx, 0).await;

    assert!(app.activate_entry("https://tech.example/2"));
    let view = app.view.as_ref().unwrap();
    assert!(!view.entries[0].is_read());
    assert!(view.entries[1].is_read());

    // Move away and come back: the stored entries are reused, not replaced
    load(&mut app, &mut rx, 1).await;
    load(&mut app, &mut rx, 0).await;
    assert!(app.view.as_ref().unwrap().entries[1].is_read());

    app.refresh();
    pump(&mut app, &mut rx).await;
    let tech = app.registry.get(0).unwrap();
    let statuses: Vec<_> = tech
        .entries
        .as_ref()
        .unwrap()
        .iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(statuses, vec![EntryStatus::Unread, EntryStatus::Read]);
}

#[tokio::test]
async fn test_activation_reaches_feeds_not_on_screen() {
    let server = MockServer::start().await;
    let (mut app, mut rx) = http_app(&server).await;
    load(&mut app, &mut rx, 1).await;
    load(&mut app, &mut rx, 0).await;

    assert!(app.activate_entry("https://news.example/1"));
    assert_eq!(app.registry.get(1).unwrap().unread_count(), Some(0));
    // The visible feed is untouched
    assert!(app.view.as_ref().unwrap().entries.iter().all(|e| !e.is_read()));

    assert!(!app.activate_entry("https://nowhere.example/"));
}

#[tokio::test]
async fn test_favorites_from_menu() {
    let server = MockServer::start().await;
    let (mut app, mut rx) = http_app(&server).await;
    load(&mut app, &mut rx, 0).await;

    app.toggle_menu();
    assert!(app.menu_visible);

    assert!(app.favorite(1));
    assert!(!app.favorite(1));
    assert_eq!(app.favorites.rows(), &[1]);
    assert!(app.registry.get(1).unwrap().is_favorite());

    assert!(app.unfavorite(1));
    assert!(app.favorites.is_empty());
    assert!(!app.registry.get(1).unwrap().is_favorite());
    assert!(!app.unfavorite(1));

    app.toggle_menu();
    assert!(!app.menu_visible);
}

/// Hands back one canned entry per URL without touching the network.
struct StaticSource;

impl FeedSource for StaticSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<FetchedEntry>, FetchError>> {
        let entry = FetchedEntry {
            title: format!("Latest from {}", url),
            link: format!("{}/latest", url),
            content: String::new(),
            published: None,
        };
        Box::pin(async move { Ok(vec![entry]) })
    }
}

#[tokio::test(start_paused = true)]
async fn test_inactivity_cycles_through_feeds() {
    let registry = FeedRegistry::new(vec![
        FeedSeed::new("One", "https://one.example/rss"),
        FeedSeed::new("Two", "https://two.example/rss"),
    ])
    .unwrap();
    let (tx, mut rx) = mpsc::channel(32);
    let mut app = App::new(registry, Arc::new(StaticSource), tx, Duration::from_secs(20));

    load(&mut app, &mut rx, 0).await;
    assert!(app.cycler.is_armed());

    // Nothing happens before the period is up
    assert!(tokio::time::timeout(Duration::from_secs(19), rx.recv())
        .await
        .is_err());

    // Expiry, then the load it triggers
    pump(&mut app, &mut rx).await;
    pump(&mut app, &mut rx).await;
    assert_eq!(app.nav.current(), 1);
    assert_eq!(app.view.as_ref().unwrap().title, "Two");

    // And around again to the first feed
    pump(&mut app, &mut rx).await;
    pump(&mut app, &mut rx).await;
    assert_eq!(app.nav.current(), 0);
}
