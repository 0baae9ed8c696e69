use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Quiet period after the last change before reloading.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches operation documents and calls back once per burst of changes.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    pub fn new<F>(paths: Vec<String>, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

        for path in &paths {
            if Path::new(path).exists() {
                watcher.watch(Path::new(path), RecursiveMode::Recursive)?;
                info!("Watching operations path: {}", path);
            } else {
                warn!("Operations path does not exist, skipping: {}", path);
            }
        }

        std::thread::spawn(move || loop {
            match rx.recv() {
                Ok(Ok(event)) if is_content_change(&event.kind) => {
                    // Swallow the rest of the burst (editors write in several steps).
                    loop {
                        match rx.recv_timeout(DEBOUNCE) {
                            Ok(_) => continue,
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                    info!("Operations changed, reloading...");
                    on_change();
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!("Watch error: {:?}", e),
                Err(e) => {
                    error!("Watch channel error: {:?}", e);
                    break;
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
