use std::convert::Infallible;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use super::Site;
use crate::ServeArgs;
use crate::build::{
    BuildResult, Builder, ChangeKind, FileWatcher, PathClassifier, WatchEvent, WatchPaths,
};
use crate::config::Config;
use crate::logger::Logger;

/// Endpoint the live reload client snippet subscribes to.
pub const LIVE_RELOAD_PATH: &str = "/_likho/live-reload";

/// SSE handler for live reload notifications.
async fn live_reload_handler(
    State(tx): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = tx.subscribe();
    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(()) => {
                    yield Ok(Event::default().event("reload").data("reload"));
                }
                // Only the latest reload matters
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn run(site: Site, args: &ServeArgs) -> Result<(), anyhow::Error> {
    let log = Logger::global().scoped("likho::serve");
    let live_reload = site.config.dev.live_reload;
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| site.config.server.host.clone());
    let port = args.port.unwrap_or(site.config.server.port);

    let (reload_tx, _) = broadcast::channel::<()>(16);

    // A failed first build aborts startup
    println!("Building site...");
    let result = builder_for(&site, live_reload).build()?;
    report("Built", &result);
    let output_dir = result.output_dir;

    let _watcher_handle = if args.no_watch {
        None
    } else {
        let paths = WatchPaths::from_config(&site.config, &site.base_path, &site.config_path);

        match FileWatcher::new(&site.config.dev.watch, PathClassifier::new(paths)) {
            Ok(watcher) => {
                println!("Watching for changes...");
                let reload_tx = reload_tx.clone();
                let log = log.clone();

                Some(tokio::task::spawn_blocking(move || {
                    watch_and_rebuild(&watcher, site, live_reload, &reload_tx, &log)
                }))
            }
            Err(e) => {
                log.warn(format_args!("failed to start file watcher: {e}"));
                None
            }
        }
    };

    let serve_dir = ServeDir::new(&output_dir).append_index_html_on_directories(true);

    let mut app = Router::new();
    if live_reload {
        app = app.route(LIVE_RELOAD_PATH, get(live_reload_handler));
    }
    let app = app.with_state(reload_tx).fallback_service(serve_dir);

    let display_host = if bind == "0.0.0.0" { "localhost" } else { &bind };
    let url = format!("http://{display_host}:{port}");

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port)).await?;

    println!("\nServing site at {url}");
    println!("Press Ctrl+C to stop\n");

    if args.open
        && let Err(e) = open::that(&url)
    {
        log.warn(format_args!("failed to open browser: {e}"));
    }

    axum::serve(listener, app).await?;

    Ok(())
}

fn builder_for(site: &Site, live_reload: bool) -> Builder {
    Builder::new(site.config.clone(), site.base_path.clone(), Logger::global())
        .with_live_reload(live_reload)
}

fn report(verb: &str, result: &BuildResult) {
    println!(
        "{verb} {} posts, {} pages, {} tags ({} files written, {} assets copied)",
        result.posts, result.pages, result.tags, result.files_written, result.assets_copied
    );
}

/// Rebuild once per change batch until the watcher goes away.
/// Runs on a single blocking task, so builds never overlap.
fn watch_and_rebuild(
    watcher: &FileWatcher,
    mut site: Site,
    live_reload: bool,
    reload_tx: &broadcast::Sender<()>,
    log: &Logger,
) {
    while let Some(event) = watcher.recv() {
        match event {
            WatchEvent::FilesChanged(changes) => {
                println!("\nDetected {} change(s), rebuilding...", changes.len());
                for change in &changes {
                    log.debug(format_args!("changed: {change:?}"));
                }

                if changes.contains(&ChangeKind::Config) {
                    match Config::load_from_arg(Some(site.config_path.as_path())) {
                        Ok(config) => {
                            let moved = moved_directories(&site.config, &config);
                            if !moved.is_empty() {
                                log.warn(format_args!(
                                    "{} changed; restart `likho serve` to serve and watch the new location",
                                    moved.join(", ")
                                ));
                            }
                            site.config = config;
                        }
                        Err(e) => {
                            log.error(format_args!("keeping previous config: {e}"));
                        }
                    }
                }

                // The builder logs the failure itself
                if let Ok(result) = builder_for(&site, live_reload).build() {
                    report("Rebuilt", &result);
                    if live_reload {
                        let _ = reload_tx.send(());
                    }
                }
            }
            WatchEvent::Error(e) => {
                log.error(format_args!("watch error: {e}"));
            }
        }
    }
}

/// Directory settings fixed when the server starts: the served output root
/// and the watched roots. Returns the keys that differ.
fn moved_directories(old: &Config, new: &Config) -> Vec<&'static str> {
    let (old_content, new_content) = (&old.content, &new.content);
    [
        (
            "content.output_dir",
            old_content.output_dir == new_content.output_dir,
        ),
        (
            "content.source_dir",
            old_content.source_dir == new_content.source_dir,
        ),
        (
            "content.templates_dir",
            old_content.templates_dir == new_content.templates_dir,
        ),
        (
            "content.assets_dir",
            old_content.assets_dir == new_content.assets_dir,
        ),
        ("theme.path", old.theme.path == new.theme.path),
    ]
    .into_iter()
    .filter(|&(_, same)| !same)
    .map(|(key, _)| key)
    .collect()
}
