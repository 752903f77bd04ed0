//! # Wayfinder
//!
//! **Wayfinder** is a minimal, template-driven HTTP route matching engine:
//! it parses route templates (`/reservations/{id:int}`, `/files/{**path}`,
//! `/docs/{name}.{ext}`), registers them in a route table and resolves
//! incoming `(method, path, query)` triples to the single most specific
//! matching route, with typed constraints and explicit ambiguity
//! reporting.
//!
//! Wayfinder is transport-agnostic by design: it does not listen on
//! sockets, invoke handlers or serialize responses. A host HTTP layer
//! calls [`Matcher::match_route`] per request and interprets the
//! [`MatchOutcome`].
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`template`]** - route template parsing into literal, parameter,
//!   catch-all and composite segments
//! - **[`constraints`]** - named predicate registry (`int`, `guid`,
//!   `alpha`, `regex(...)`, length/range constraints, custom entries)
//! - **[`table`]** - the route table, sole owner and mutator of
//!   registered routes
//! - **[`matcher`]** - structural matching, constraint filtering and
//!   specificity-based disambiguation
//! - **[`shared`]** - lock-free snapshot sharing for concurrent callers
//! - **[`config`]** - YAML/JSON route-set loading
//! - **[`reload`]** - live reloading of the route configuration file
//! - **[`linter`]** - static analysis of route configurations
//! - **[`cli`]** - `wayfinder` binary: lint, dump and ad-hoc matching
//!
//! ## Matching flow
//!
//! ```text
//! routes.yaml ──► config::build_table ──► RouteTable ──► Matcher
//!                                              ▲            │
//!                      ConstraintRegistry ─────┘            ▼
//!   (method, path, query) ────────────────────────► MatchOutcome
//!     Matched | NoMatch | Ambiguous | ConstraintViolation
//! ```
//!
//! ## Example
//!
//! ```rust
//! use wayfinder::{ConstraintRegistry, Matcher, RouteDef, RouteTable};
//! use http::Method;
//!
//! # fn main() -> Result<(), wayfinder::template::ParseError> {
//! let registry = ConstraintRegistry::default();
//! let mut table = RouteTable::new();
//! table.add(&registry, RouteDef::new("/reservations/List", "GET", "list"))?;
//! table.add(&registry, RouteDef::new("/reservations/{id:int}", "GET", "by_id"))?;
//! table.add(&registry, RouteDef::new("/reservations/{id:alpha}", "GET", "by_code"))?;
//!
//! let matcher = Matcher::new(table);
//!
//! let outcome = matcher.match_route(&Method::GET, "/reservations/123", &[]);
//! let matched = outcome.matched().expect("int route should win");
//! assert_eq!(matched.route.handler_name, "by_id");
//! assert_eq!(matched.get_param("id"), Some("123"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Determinism
//!
//! Matching is pure and deterministic: given an unchanged table, the same
//! input always produces the same outcome, regardless of registration
//! order. Equally specific candidates are reported as
//! [`MatchOutcome::Ambiguous`] rather than silently tie-broken.

pub mod cli;
pub mod config;
pub mod constraints;
pub mod linter;
pub mod matcher;
pub mod reload;
pub mod shared;
pub mod table;
pub mod template;

pub use constraints::{ConstraintFn, ConstraintRegistry};
pub use matcher::{MatchOutcome, Matcher, ParamVec, RouteMatch};
pub use shared::SharedMatcher;
pub use table::{RegisteredRoute, RouteDef, RouteId, RouteTable};
pub use template::{ConstraintSpec, ParseError, RouteTemplate, Segment};
