//! # Route Linter Module
//!
//! Static analysis for route configuration files, catching configuration
//! defects before a single request is matched.
//!
//! ## Checks Performed
//!
//! 1. **Template validity** - every pattern must parse and register
//!    (unknown constraints, reserved names, misplaced catch-alls...)
//! 2. **Static ambiguity** - two routes with the same method and the same
//!    structural shape would tie at match time and produce `Ambiguous`
//! 3. **Duplicate handlers** - the same handler name on several routes
//! 4. **Shadowed parameters** - a literal route that always outranks a
//!    parameterized route for one concrete path
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wayfinder::linter::{lint_route_file, LintSeverity};
//!
//! let issues = lint_route_file("routes.yaml".as_ref(), &registry)?;
//! for issue in &issues {
//!     eprintln!("[{}] {}: {}", issue.severity, issue.location, issue.message);
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::config;
use crate::constraints::ConstraintRegistry;
use crate::table::{RouteDef, RouteTable};
use crate::template::{CompositePart, RouteTemplate, Segment};

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Error - the route set will misbehave at match time
    Error,
    /// Warning - suspicious but not fatal
    Warning,
    /// Info - worth knowing, by-design behavior
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "error"),
            LintSeverity::Warning => write!(f, "warning"),
            LintSeverity::Info => write!(f, "info"),
        }
    }
}

/// A lint issue found in a route configuration
#[derive(Debug, Clone)]
pub struct LintIssue {
    /// Where the issue occurred (e.g. `GET /reservations/{id}`)
    pub location: String,
    /// Severity of the issue
    pub severity: LintSeverity,
    /// Kind of lint issue (e.g. `invalid_template`, `ambiguous_routes`)
    pub kind: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl LintIssue {
    /// Create a new lint issue
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the issue
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// True when any issue in `issues` is an error.
#[must_use]
pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == LintSeverity::Error)
}

/// Lint a route configuration file.
///
/// # Errors
///
/// Fails only when the file itself cannot be loaded; template problems
/// are reported as issues, not errors.
pub fn lint_route_file(
    path: &Path,
    registry: &ConstraintRegistry,
) -> anyhow::Result<Vec<LintIssue>> {
    let defs = config::load_route_defs(path)?;
    Ok(lint_route_defs(&defs, registry))
}

/// Lint a list of route definitions.
pub fn lint_route_defs(defs: &[RouteDef], registry: &ConstraintRegistry) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut parsed: Vec<(usize, RouteTemplate)> = Vec::new();

    // 1. Template validity, via the same registration path the real
    //    table uses.
    for (i, def) in defs.iter().enumerate() {
        let mut scratch = RouteTable::new();
        match scratch.add(registry, def.clone()) {
            Ok(_) => {
                if let Ok(template) = RouteTemplate::parse(&def.pattern) {
                    parsed.push((i, template));
                }
            }
            Err(e) => {
                issues.push(LintIssue::new(
                    location(def),
                    LintSeverity::Error,
                    "invalid_template",
                    e.to_string(),
                ));
            }
        }
    }

    // 2. Static ambiguity: identical method + identical structural shape.
    for (a_idx, (a, a_template)) in parsed.iter().enumerate() {
        for (b, b_template) in parsed.iter().skip(a_idx + 1) {
            let (a_def, b_def) = (&defs[*a], &defs[*b]);
            if !a_def.method.eq_ignore_ascii_case(&b_def.method) {
                continue;
            }
            if shape(a_template) == shape(b_template) {
                issues.push(
                    LintIssue::new(
                        location(a_def),
                        LintSeverity::Error,
                        "ambiguous_routes",
                        format!(
                            "`{}` and `{}` have identical structure and will tie at match time",
                            a_def.pattern, b_def.pattern
                        ),
                    )
                    .with_suggestion("add a literal segment or a constraint to one of the routes"),
                );
            } else if shadows(a_template, b_template) {
                issues.push(LintIssue::new(
                    location(b_def),
                    LintSeverity::Info,
                    "shadowed_parameter",
                    format!(
                        "literal route `{}` outranks `{}` for that exact path",
                        a_def.pattern, b_def.pattern
                    ),
                ));
            } else if shadows(b_template, a_template) {
                issues.push(LintIssue::new(
                    location(a_def),
                    LintSeverity::Info,
                    "shadowed_parameter",
                    format!(
                        "literal route `{}` outranks `{}` for that exact path",
                        b_def.pattern, a_def.pattern
                    ),
                ));
            }
        }
    }

    // 3. Duplicate handler names.
    let mut by_handler: HashMap<&str, Vec<&RouteDef>> = HashMap::new();
    for def in defs {
        by_handler.entry(def.handler.as_str()).or_default().push(def);
    }
    for (handler, routes) in by_handler {
        if routes.len() > 1 {
            issues.push(LintIssue::new(
                location(routes[0]),
                LintSeverity::Warning,
                "duplicate_handler",
                format!("handler `{handler}` is attached to {} routes", routes.len()),
            ));
        }
    }

    issues
}

fn location(def: &RouteDef) -> String {
    format!("{} {}", def.method.to_ascii_uppercase(), def.pattern)
}

/// Structural shape of a template, ignoring parameter names and constraint
/// arguments; equal shapes tie under the specificity order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShapeItem {
    Literal(String),
    Constrained(Vec<String>),
    Unconstrained,
    Optional,
    CatchAll,
    Composite(Vec<ShapeItem>),
}

fn shape(template: &RouteTemplate) -> Vec<ShapeItem> {
    template
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Literal { text } => ShapeItem::Literal(text.to_ascii_lowercase()),
            Segment::Parameter {
                constraints,
                optional: true,
                ..
            } if constraints.is_empty() => ShapeItem::Optional,
            Segment::Parameter { constraints, .. } => {
                if constraints.is_empty() {
                    ShapeItem::Unconstrained
                } else {
                    ShapeItem::Constrained(
                        constraints
                            .iter()
                            .map(|c| c.name.to_ascii_lowercase())
                            .collect(),
                    )
                }
            }
            Segment::CatchAll { .. } => ShapeItem::CatchAll,
            Segment::Composite { parts } => ShapeItem::Composite(
                parts
                    .iter()
                    .map(|p| match p {
                        CompositePart::Literal(text) => {
                            ShapeItem::Literal(text.to_ascii_lowercase())
                        }
                        CompositePart::Parameter { constraints, .. } => {
                            if constraints.is_empty() {
                                ShapeItem::Unconstrained
                            } else {
                                ShapeItem::Constrained(
                                    constraints
                                        .iter()
                                        .map(|c| c.name.to_ascii_lowercase())
                                        .collect(),
                                )
                            }
                        }
                    })
                    .collect(),
            ),
        })
        .collect()
}

/// True when `literal` is an all-literal template that would also
/// structurally match `other` (so `other` never sees that path).
fn shadows(literal: &RouteTemplate, other: &RouteTemplate) -> bool {
    if !literal.is_static() {
        return false;
    }
    if literal.segments().len() != other.segments().len() {
        return false;
    }
    literal
        .segments()
        .iter()
        .zip(other.segments())
        .all(|(lit, seg)| match (lit, seg) {
            (Segment::Literal { text: a }, Segment::Literal { text: b }) => {
                a.eq_ignore_ascii_case(b)
            }
            (Segment::Literal { .. }, Segment::Parameter { .. }) => true,
            _ => false,
        })
        && other
            .segments()
            .iter()
            .any(|s| matches!(s, Segment::Parameter { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(patterns: &[(&str, &str, &str)]) -> Vec<RouteDef> {
        patterns
            .iter()
            .map(|(p, m, h)| RouteDef::new(*p, *m, *h))
            .collect()
    }

    #[test]
    fn test_invalid_template_reported() {
        let registry = ConstraintRegistry::default();
        let issues = lint_route_defs(&defs(&[("/a/{controller}", "GET", "h1")]), &registry);
        assert!(has_errors(&issues));
        assert_eq!(issues[0].kind, "invalid_template");
    }

    #[test]
    fn test_static_ambiguity_detected() {
        let registry = ConstraintRegistry::default();
        let issues = lint_route_defs(
            &defs(&[("/a/{x}", "GET", "h1"), ("/a/{y}", "GET", "h2")]),
            &registry,
        );
        assert!(issues.iter().any(|i| i.kind == "ambiguous_routes"));
    }

    #[test]
    fn test_different_methods_not_ambiguous() {
        let registry = ConstraintRegistry::default();
        let issues = lint_route_defs(
            &defs(&[("/a/{x}", "GET", "h1"), ("/a/{y}", "POST", "h2")]),
            &registry,
        );
        assert!(!issues.iter().any(|i| i.kind == "ambiguous_routes"));
    }

    #[test]
    fn test_duplicate_handler_warning() {
        let registry = ConstraintRegistry::default();
        let issues = lint_route_defs(
            &defs(&[("/a", "GET", "h"), ("/b", "GET", "h")]),
            &registry,
        );
        assert!(issues.iter().any(|i| i.kind == "duplicate_handler"));
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_shadowed_parameter_info() {
        let registry = ConstraintRegistry::default();
        let issues = lint_route_defs(
            &defs(&[("/a/list", "GET", "h1"), ("/a/{id}", "GET", "h2")]),
            &registry,
        );
        assert!(issues.iter().any(|i| i.kind == "shadowed_parameter"));
    }
}
