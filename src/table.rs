//! # Route Table Module
//!
//! The route table owns every registered route. It is the only mutator:
//! routes enter through [`RouteTable::add`] (which parses the template,
//! enforces registration-time invariants and compiles constraint checks)
//! and leave through [`RouteTable::remove`]. Matching reads the table but
//! never changes it, so matching outcome is independent of registration
//! order.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;

use crate::constraints::{ConstraintFn, ConstraintRegistry};
use crate::template::{ParseError, RouteTemplate};

/// Strongly typed route identifier backed by ULID.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct RouteId(pub ulid::Ulid);

impl RouteId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    #[must_use]
    pub fn from_ulid(id: ulid::Ulid) -> Self {
        Self(id)
    }
}

impl Default for RouteId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RouteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RouteId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = ulid::Ulid::from_string(s)?;
        Ok(RouteId(id))
    }
}

impl Serialize for RouteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RouteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<RouteId>()
            .map_err(|_| serde::de::Error::custom("invalid route id"))
    }
}

/// A route definition as supplied by configuration: the raw template
/// string, the HTTP method, the handler name and an opaque metadata
/// payload passed through to the host untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDef {
    pub pattern: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub handler: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

fn default_method() -> String {
    "GET".to_string()
}

impl RouteDef {
    pub fn new(pattern: impl Into<String>, method: impl Into<String>, handler: impl Into<String>) -> Self {
        RouteDef {
            pattern: pattern.into(),
            method: method.into(),
            handler: handler.into(),
            metadata: serde_json::Value::Null,
        }
    }
}

/// A constraint compiled against the registry at registration time,
/// remembered together with the parameter it applies to.
#[derive(Clone)]
pub struct CompiledCheck {
    /// Name of the parameter the predicate applies to
    pub parameter: Arc<str>,
    /// Constraint name as written in the template (for diagnostics)
    pub constraint: String,
    pub(crate) predicate: ConstraintFn,
}

impl CompiledCheck {
    /// Evaluate the predicate against a raw parameter value.
    #[must_use]
    pub fn check(&self, value: &str) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for CompiledCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCheck")
            .field("parameter", &self.parameter)
            .field("constraint", &self.constraint)
            .finish()
    }
}

/// A route owned by the table: parsed template, compiled constraint
/// checks, interned parameter names and the host metadata.
#[derive(Debug, Clone)]
pub struct RegisteredRoute {
    pub id: RouteId,
    pub method: Method,
    pub raw_pattern: String,
    pub template: RouteTemplate,
    pub handler_name: String,
    pub metadata: serde_json::Value,
    pub(crate) checks: Vec<CompiledCheck>,
    /// Parameter names interned once at registration so the match hot
    /// path clones an `Arc<str>` instead of copying the string.
    pub(crate) names: HashMap<String, Arc<str>>,
}

impl RegisteredRoute {
    /// Interned handle for a parameter name declared by this route.
    pub(crate) fn interned(&self, name: &str) -> Arc<str> {
        self.names
            .get(name)
            .cloned()
            .unwrap_or_else(|| Arc::from(name))
    }
}

/// An unordered set of registered routes.
///
/// Mutation (`add`/`remove`) must be serialized against concurrent
/// matching; the usual discipline is to build a table at startup, wrap the
/// matcher in a [`SharedMatcher`](crate::shared::SharedMatcher) and swap
/// whole snapshots on reconfiguration.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<RegisteredRoute>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, validate and register one route definition.
    ///
    /// Every [`crate::template::ConstraintSpec`] the template references is
    /// resolved against `registry` here; matching never touches the
    /// registry again.
    ///
    /// # Errors
    ///
    /// Propagates [`ParseError`] from the template parser, constraint
    /// resolution failures (`UnknownConstraint`,
    /// `InvalidConstraintArgument`) and `InvalidMethod` for an
    /// unrecognized HTTP method string.
    pub fn add(
        &mut self,
        registry: &ConstraintRegistry,
        def: RouteDef,
    ) -> Result<RouteId, ParseError> {
        let template = RouteTemplate::parse(&def.pattern)?;
        let method = Method::from_bytes(def.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| ParseError::InvalidMethod(def.method.clone()))?;

        let mut checks = Vec::new();
        for segment in template.segments() {
            for (param, spec) in segment.constraint_specs() {
                checks.push(CompiledCheck {
                    parameter: Arc::from(param),
                    constraint: spec.name.clone(),
                    predicate: registry.resolve(spec)?,
                });
            }
        }
        for binding in template.query_bindings() {
            for spec in &binding.constraints {
                checks.push(CompiledCheck {
                    parameter: Arc::from(binding.name.as_str()),
                    constraint: spec.name.clone(),
                    predicate: registry.resolve(spec)?,
                });
            }
        }

        let names: HashMap<String, Arc<str>> = template
            .parameter_names()
            .into_iter()
            .map(|n| (n.to_string(), Arc::from(n)))
            .collect();

        let id = RouteId::new();
        self.routes.push(Arc::new(RegisteredRoute {
            id,
            method,
            raw_pattern: def.pattern,
            template,
            handler_name: def.handler,
            metadata: def.metadata,
            checks,
            names,
        }));
        Ok(id)
    }

    /// Register a whole definition list, logging the loaded table the way
    /// the matcher expects to find it at startup.
    ///
    /// # Errors
    ///
    /// Fails on the first bad definition; earlier additions stay in the
    /// table.
    pub fn add_all(
        &mut self,
        registry: &ConstraintRegistry,
        defs: impl IntoIterator<Item = RouteDef>,
    ) -> Result<Vec<RouteId>, ParseError> {
        let ids = defs
            .into_iter()
            .map(|def| self.add(registry, def))
            .collect::<Result<Vec<_>, _>>()?;

        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method, r.raw_pattern))
            .collect();
        info!(
            routes_count = self.routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
        Ok(ids)
    }

    /// Remove a route by id. Returns false when the id is not present.
    pub fn remove(&mut self, id: RouteId) -> bool {
        let before = self.routes.len();
        self.routes.retain(|r| r.id != id);
        self.routes.len() != before
    }

    /// Look up a route by id.
    #[must_use]
    pub fn get(&self, id: RouteId) -> Option<&Arc<RegisteredRoute>> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegisteredRoute>> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// All registered raw patterns, e.g. for host-side diagnostics.
    #[must_use]
    pub fn all_patterns(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.raw_pattern.clone()).collect()
    }

    /// Print all registered routes to stdout.
    ///
    /// Useful for debugging and verifying that routes are loaded correctly.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for route in &self.routes {
            println!(
                "[route] {} {} -> {} ({})",
                route.method, route.raw_pattern, route.handler_name, route.id
            );
        }
    }
}
