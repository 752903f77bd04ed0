//! # Configuration Module
//!
//! Route-set configuration loading.
//!
//! Routes are supplied once at startup as a YAML or JSON file (chosen by
//! extension) holding a `routes` list:
//!
//! ```yaml
//! routes:
//!   - pattern: /reservations/{id:int}
//!     method: GET
//!     handler: get_reservation
//!   - pattern: /reservations/{**rest}
//!     method: GET
//!     handler: reservation_fallback
//!     metadata:
//!       auth: none
//! ```
//!
//! `method` defaults to `GET`; `metadata` is an opaque payload handed
//! back to the host on every match of that route.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::constraints::ConstraintRegistry;
use crate::matcher::Matcher;
use crate::table::{RouteDef, RouteTable};

#[derive(Debug, Deserialize)]
struct RouteFile {
    #[serde(default)]
    routes: Vec<RouteDef>,
}

/// Load route definitions from a YAML or JSON file.
///
/// # Errors
///
/// Fails when the file cannot be read or does not deserialize into a
/// route list. Template validity is not checked here; that happens when
/// the definitions are added to a table.
pub fn load_route_defs(path: &Path) -> anyhow::Result<Vec<RouteDef>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route config {}", path.display()))?;
    let is_yaml = path
        .extension()
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);
    let file: RouteFile = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(file.routes)
}

/// Load a config file and register every definition into a fresh table.
///
/// # Errors
///
/// Propagates load failures and the first registration failure, with the
/// offending pattern in the error context.
pub fn build_table(path: &Path, registry: &ConstraintRegistry) -> anyhow::Result<RouteTable> {
    let defs = load_route_defs(path)?;
    let mut table = RouteTable::new();
    for def in defs {
        let pattern = def.pattern.clone();
        table
            .add(registry, def)
            .with_context(|| format!("failed to register route `{pattern}`"))?;
    }
    Ok(table)
}

/// Load a config file straight into a ready matcher.
///
/// # Errors
///
/// Same failure modes as [`build_table`].
pub fn build_matcher(path: &Path, registry: &ConstraintRegistry) -> anyhow::Result<Matcher> {
    Ok(Matcher::new(build_table(path, registry)?))
}
