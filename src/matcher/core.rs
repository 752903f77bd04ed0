//! Matcher core - hot path for route resolution.
//!
//! Matching is a pure, read-only operation over an immutable
//! [`RouteTable`]: every registered route is walked structurally against
//! the request path, constraint checks filter the structural matches, and
//! the specificity order picks the single winner or reports the tie.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::specificity::{SegmentRank, Specificity};
use crate::table::{RegisteredRoute, RouteId, RouteTable};
use crate::template::{CompositePart, Segment};

/// Maximum number of extracted parameters before heap allocation.
/// Most route templates bind ≤4 parameters; keep the common case on the
/// stack.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` clones of the interned names held by the
/// route table; values are per-request strings extracted from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (Arc to avoid expensive clones)
    pub route: Arc<RegisteredRoute>,
    /// Extracted parameter values, path bindings first, then query
    /// bindings
    pub params: ParamVec,
}

impl RouteMatch {
    /// Get an extracted parameter by name.
    ///
    /// Uses "last write wins" semantics when duplicate names exist.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert params to a HashMap for compatibility with host code.
    /// Note: this allocates - use `get_param()` in hot paths instead.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Outcome of one `match_route` call.
///
/// All match-time conditions are explicit values; the matcher never
/// panics and never silently picks between equally specific candidates.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// A single most-specific route matched
    Matched(RouteMatch),
    /// No route structurally matched (ordinary "not found")
    NoMatch,
    /// Two or more routes tied at the top specificity rank; a
    /// configuration defect the caller must surface, not resolve
    Ambiguous { candidates: Vec<RouteId> },
    /// Exactly one route structurally matched but a constraint rejected
    /// one of its parameter values
    ConstraintViolation {
        route: RouteId,
        constraint: String,
        parameter: String,
    },
}

impl MatchOutcome {
    /// The matched route, if any.
    #[must_use]
    pub fn matched(&self) -> Option<&RouteMatch> {
        match self {
            MatchOutcome::Matched(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_no_match(&self) -> bool {
        matches!(self, MatchOutcome::NoMatch)
    }
}

/// A structurally matching route together with its extracted parameters
/// and specificity score. Ephemeral: computed per request, discarded
/// after the outcome is produced.
struct Candidate {
    route: Arc<RegisteredRoute>,
    params: ParamVec,
    specificity: Specificity,
    /// First failing constraint check, if any: (constraint, parameter)
    violation: Option<(String, String)>,
}

/// Matches HTTP requests against an immutable route table.
///
/// `match_route` is `&self`, side-effect-free and deterministic: repeated
/// calls with the same table and input return the same outcome, and
/// concurrent callers need no synchronization as long as nobody mutates
/// the table underneath them (see
/// [`SharedMatcher`](crate::shared::SharedMatcher) for the snapshot-swap
/// discipline).
#[derive(Debug, Clone)]
pub struct Matcher {
    table: RouteTable,
}

impl Matcher {
    /// Wrap a fully populated route table.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        info!(routes_count = table.len(), "Matcher ready");
        Matcher { table }
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Match a request against every registered route.
    ///
    /// `query` carries the request's query parameters as key/value pairs,
    /// already URL-decoded by the host.
    ///
    /// # Returns
    ///
    /// * [`MatchOutcome::Matched`] - a single most specific route matched
    /// * [`MatchOutcome::NoMatch`] - nothing matched structurally, or
    ///   several structural matches all failed their constraints
    /// * [`MatchOutcome::Ambiguous`] - two or more passing routes tied
    /// * [`MatchOutcome::ConstraintViolation`] - the sole structural
    ///   match failed a constraint
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str, query: &[(String, String)]) -> MatchOutcome {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = std::time::Instant::now();

        let components = split_path(path);
        let mut structural: Vec<Candidate> = Vec::new();

        for route in self.table.iter() {
            if route.method != *method {
                continue;
            }
            if let Some((params, specificity)) = walk(route, &components, query) {
                let violation = first_violation(route, &params);
                structural.push(Candidate {
                    route: Arc::clone(route),
                    params,
                    specificity,
                    violation,
                });
            }
        }

        let outcome = select(structural);
        let match_duration = match_start.elapsed();

        match &outcome {
            MatchOutcome::Matched(m) => {
                if match_duration > std::time::Duration::from_millis(1) {
                    warn!(
                        method = %method,
                        path = %path,
                        route_pattern = %m.route.raw_pattern,
                        handler_name = %m.route.handler_name,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        method = %method,
                        path = %path,
                        route_pattern = %m.route.raw_pattern,
                        handler_name = %m.route.handler_name,
                        params = ?m.params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
            }
            MatchOutcome::NoMatch => {
                warn!(
                    method = %method,
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
            }
            MatchOutcome::Ambiguous { candidates } => {
                warn!(
                    method = %method,
                    path = %path,
                    candidates = ?candidates,
                    "Ambiguous route match"
                );
            }
            MatchOutcome::ConstraintViolation {
                route,
                constraint,
                parameter,
            } => {
                warn!(
                    method = %method,
                    path = %path,
                    route = %route,
                    constraint = %constraint,
                    parameter = %parameter,
                    "Constraint rejected sole structural match"
                );
            }
        }

        outcome
    }
}

/// Pick the outcome from the structural candidates.
fn select(structural: Vec<Candidate>) -> MatchOutcome {
    let structural_count = structural.len();
    let mut passing: Vec<Candidate> = Vec::with_capacity(structural_count);
    let mut sole_violation: Option<(RouteId, String, String)> = None;

    for candidate in structural {
        match candidate.violation {
            None => passing.push(candidate),
            Some((constraint, parameter)) => {
                // Remembered in case this turns out to be the only
                // structural match: a sole near-match with a failing
                // constraint is a definite reject, not a fall-through.
                if structural_count == 1 {
                    sole_violation = Some((candidate.route.id, constraint, parameter));
                }
            }
        }
    }

    if passing.is_empty() {
        return match sole_violation {
            Some((route, constraint, parameter)) => MatchOutcome::ConstraintViolation {
                route,
                constraint,
                parameter,
            },
            None => MatchOutcome::NoMatch,
        };
    }

    let best = passing
        .iter()
        .map(|c| &c.specificity)
        .min()
        .cloned()
        .unwrap_or_else(|| Specificity::new(Vec::new()));

    let mut top: Vec<Candidate> = passing
        .into_iter()
        .filter(|c| c.specificity == best)
        .collect();

    if top.len() == 1 {
        let winner = top.remove(0);
        MatchOutcome::Matched(RouteMatch {
            route: winner.route,
            params: winner.params,
        })
    } else {
        let mut candidates: Vec<(String, RouteId)> = top
            .iter()
            .map(|c| (c.route.raw_pattern.clone(), c.route.id))
            .collect();
        // Order by raw pattern so the outcome does not depend on
        // registration order.
        candidates.sort();
        MatchOutcome::Ambiguous {
            candidates: candidates.into_iter().map(|(_, id)| id).collect(),
        }
    }
}

/// Split a request path into percent-decoded components.
fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|c| !c.is_empty())
        .map(percent_decode)
        .collect()
}

fn percent_decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| component.to_string())
}

/// Walk a route's segments against the path components positionally.
///
/// Returns the extracted parameters (path bindings first, then query
/// bindings) and the specificity score of the matched shape, or `None`
/// when the route is structurally excluded.
fn walk(
    route: &Arc<RegisteredRoute>,
    components: &[String],
    query: &[(String, String)],
) -> Option<(ParamVec, Specificity)> {
    let segments = route.template.segments();
    let mut params = ParamVec::new();
    let mut ranks = Vec::with_capacity(segments.len());
    let mut i = 0usize;

    for segment in segments {
        match segment {
            Segment::Literal { text } => {
                let component = components.get(i)?;
                if !text.eq_ignore_ascii_case(component) {
                    return None;
                }
                i += 1;
                ranks.push(SegmentRank::Literal);
            }
            Segment::Parameter {
                name,
                constraints,
                optional,
            } => match components.get(i) {
                Some(component) if !component.is_empty() => {
                    params.push((route.interned(name), component.clone()));
                    i += 1;
                    ranks.push(if constraints.is_empty() {
                        SegmentRank::Unconstrained
                    } else {
                        SegmentRank::Constrained
                    });
                }
                _ if *optional => ranks.push(SegmentRank::OptionalAbsent),
                _ => return None,
            },
            Segment::CatchAll { name } => {
                let rest = components[i.min(components.len())..].join("/");
                params.push((route.interned(name), rest));
                i = components.len();
                ranks.push(SegmentRank::CatchAll);
            }
            Segment::Composite { parts } => {
                let component = components.get(i)?;
                walk_composite(route, parts, component, &mut params)?;
                i += 1;
                ranks.push(SegmentRank::Constrained);
            }
        }
    }

    if i != components.len() {
        return None;
    }

    // Query bindings never consume path components and never rank;
    // absent keys just leave the parameter unbound.
    for binding in route.template.query_bindings() {
        if let Some((_, value)) = query.iter().rfind(|(k, _)| k == &binding.key) {
            params.push((route.interned(&binding.name), value.clone()));
        }
    }

    Some((params, Specificity::new(ranks)))
}

/// Decompose one path component according to a composite segment's
/// literal delimiters.
///
/// Parameters extend to the last occurrence of the following delimiter so
/// dotted names keep their extension: `{file}.{ext}` against `a.b.c`
/// binds `file = "a.b"`, `ext = "c"`.
fn walk_composite(
    route: &Arc<RegisteredRoute>,
    parts: &[CompositePart],
    component: &str,
    params: &mut ParamVec,
) -> Option<()> {
    let lower = component.to_ascii_lowercase();

    // A leading literal anchors the front of the component, so a value
    // that happens to start with the same text stays with the parameter
    // (`v{version}` against `vv2` binds `version = "v2"`). Only interior
    // delimiters use the rightmost-split rule below.
    let (parts, begin) = match parts.first() {
        Some(CompositePart::Literal(text)) => {
            if !lower.starts_with(&text.to_ascii_lowercase()) {
                return None;
            }
            (&parts[1..], text.len())
        }
        _ => (parts, 0),
    };

    // Matched right to left so a parameter greedily keeps delimiter
    // characters that belong to it.
    let mut end = component.len();
    let mut extracted: Vec<(Arc<str>, String)> = Vec::with_capacity(parts.len());

    for (pi, part) in parts.iter().enumerate().rev() {
        match part {
            CompositePart::Literal(text) => {
                let text_lower = text.to_ascii_lowercase();
                if end < begin + text.len() || !lower[..end].ends_with(&text_lower) {
                    return None;
                }
                end -= text.len();
            }
            CompositePart::Parameter { name, .. } => {
                let start = match pi.checked_sub(1).map(|p| &parts[p]) {
                    Some(CompositePart::Literal(delim)) => {
                        let delim_lower = delim.to_ascii_lowercase();
                        lower[begin..end].rfind(&delim_lower)? + begin + delim.len()
                    }
                    _ => begin,
                };
                if start >= end {
                    return None;
                }
                extracted.push((route.interned(name), component[start..end].to_string()));
                end = start;
            }
        }
    }

    if end != begin {
        return None;
    }
    // Restore declaration order for the extracted bindings.
    params.extend(extracted.into_iter().rev());
    Some(())
}

/// First failing constraint check for a candidate, if any.
///
/// Checks against unbound parameters (absent optionals, missing query
/// keys) are skipped; a constraint only rejects a value that was actually
/// extracted.
fn first_violation(route: &RegisteredRoute, params: &ParamVec) -> Option<(String, String)> {
    for check in &route.checks {
        let bound = params
            .iter()
            .rfind(|(k, _)| k.as_ref() == check.parameter.as_ref());
        if let Some((_, value)) = bound {
            if !check.check(value) {
                return Some((check.constraint.clone(), check.parameter.to_string()));
            }
        }
    }
    None
}
