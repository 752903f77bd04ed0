//! # Hot Reload Module
//!
//! Live reloading of the route configuration file without restarting the
//! host process.
//!
//! ## Overview
//!
//! A filesystem watcher observes the route config file and, on change:
//!
//! 1. **Detection** - the watcher reports a modify/create event
//! 2. **Rebuild** - the config is reloaded and a new table/matcher built
//! 3. **Swap** - the new matcher is stored into the [`SharedMatcher`]
//! 4. **Hook** - a caller-supplied callback observes the reload
//!
//! If the new config fails to load or register, the error is logged and
//! the previous snapshot stays active; requests keep being served.
//!
//! Hot reload is a development convenience, not a correctness feature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wayfinder::{reload::watch_route_config, ConstraintRegistry, SharedMatcher};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ConstraintRegistry::default());
//! let shared = Arc::new(SharedMatcher::new(matcher));
//!
//! let watcher = watch_route_config(
//!     "routes.yaml",
//!     Arc::clone(&shared),
//!     Arc::clone(&registry),
//!     |count| println!("reloaded {count} routes"),
//! )?;
//!
//! // Keep watcher alive for as long as reloads should apply
//! std::mem::forget(watcher);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::config;
use crate::constraints::ConstraintRegistry;
use crate::shared::SharedMatcher;

/// Reload the config once and swap the result into `shared`.
///
/// Returns the number of routes in the new snapshot. Used by the watcher
/// on every file event; callable directly for synchronous reloads.
///
/// # Errors
///
/// Propagates load/registration failures; on error `shared` is left
/// untouched.
pub fn reload_once(
    path: &Path,
    shared: &SharedMatcher,
    registry: &ConstraintRegistry,
) -> anyhow::Result<usize> {
    let matcher = config::build_matcher(path, registry)?;
    let count = matcher.table().len();
    shared.store(matcher);
    Ok(count)
}

/// Watch a route config file and rebuild the matcher when it changes.
///
/// The callback receives the new route count after every successful
/// reload. The returned watcher must be kept alive for events to fire.
///
/// # Errors
///
/// Fails when the watcher cannot be installed on `config_path`.
pub fn watch_route_config<P, F>(
    config_path: P,
    shared: Arc<SharedMatcher>,
    registry: Arc<ConstraintRegistry>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(usize) + Send + 'static,
{
    let path: PathBuf = config_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload_once(&watch_path, &shared, &registry) {
                        Ok(count) => {
                            info!(
                                routes_count = count,
                                config = %watch_path.display(),
                                "hot-reload: applied route updates"
                            );
                            on_reload(count);
                        }
                        Err(e) => {
                            warn!(
                                config = %watch_path.display(),
                                error = %e,
                                "hot-reload: keeping previous routes"
                            );
                        }
                    }
                }
            }
            Err(e) => warn!(error = ?e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
