//! # Matcher Module
//!
//! Path matching and route resolution.
//!
//! ## Overview
//!
//! The matcher is responsible for:
//! - Walking every registered template against an incoming request path
//! - Extracting path and query parameter values
//! - Applying compiled constraint checks
//! - Selecting the single most specific match, or reporting ambiguity
//!
//! ## Architecture
//!
//! Matching proceeds in three phases per request:
//!
//! 1. **Structural matching**: each route's segments are walked against
//!    the path components positionally. Literal mismatches and component
//!    count mismatches (accounting for optional and catch-all segments)
//!    exclude a route immediately.
//! 2. **Constraint filtering**: extracted values are run through the
//!    constraint checks compiled at registration time. A failing check
//!    excludes the route, unless it was the only structural match - that
//!    sole near-match surfaces as a
//!    [`MatchOutcome::ConstraintViolation`].
//! 3. **Specificity selection**: survivors are ranked by the shape of
//!    what they matched (literal over constrained parameter over
//!    unconstrained parameter over catch-all); a unique minimum wins and
//!    a tie is reported as [`MatchOutcome::Ambiguous`].
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
//! table.add(&registry, RouteDef::new("/pets/{id:int}", "GET", "get_pet"))?;
//!
//! let matcher = Matcher::new(table);
//! let outcome = matcher.match_route(&Method::GET, "/pets/42", &[]);
//! let matched = outcome.matched().expect("route should match");
//! assert_eq!(matched.get_param("id"), Some("42"));
//! # Ok(())
//! # }
//! ```

mod core;
mod specificity;

pub use self::core::{MatchOutcome, Matcher, ParamVec, RouteMatch, MAX_INLINE_PARAMS};
pub use self::specificity::{SegmentRank, Specificity};
