use std::fmt;

/// Parameter names that collide with host-framework conventions and are
/// rejected at registration time.
pub const RESERVED_PARAMETER_NAMES: [&str; 5] = ["action", "area", "controller", "handler", "page"];

/// Returns true if `name` is one of [`RESERVED_PARAMETER_NAMES`]
/// (compared case-insensitively).
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_PARAMETER_NAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(name))
}

/// A named constraint reference attached to a parameter, e.g. `int`,
/// `minlength(1)` or `regex(^\d+$)`.
///
/// The spec is pure data; it is resolved to a predicate against a
/// [`ConstraintRegistry`](crate::constraints::ConstraintRegistry) when the
/// route is added to a table, never at match time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSpec {
    /// Constraint name as written in the template (e.g. `minlength`)
    pub name: String,
    /// Ordered raw argument strings (e.g. `["1"]`)
    pub arguments: Vec<String>,
}

impl ConstraintSpec {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        ConstraintSpec {
            name: name.into(),
            arguments,
        }
    }
}

impl fmt::Display for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.arguments.join(","))
        }
    }
}

/// One piece of a [`Segment::Composite`] path component, e.g. the three
/// parts of `{file}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositePart {
    /// Literal delimiter text between parameters
    Literal(String),
    /// Embedded parameter with optional constraints
    Parameter {
        name: String,
        constraints: Vec<ConstraintSpec>,
    },
}

/// One unit of a parsed route template.
///
/// A template like `/files/{dir}/{name}.{ext}/{**rest}` parses into a
/// `Literal`, a `Parameter`, a `Composite` and a `CatchAll` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path component exactly (case-insensitive)
    Literal { text: String },
    /// Consumes exactly one path component, or zero when `optional` and the
    /// path has no component left for it
    Parameter {
        name: String,
        constraints: Vec<ConstraintSpec>,
        optional: bool,
    },
    /// Consumes all remaining path components (possibly zero) as one value;
    /// legal only as the final segment
    CatchAll { name: String },
    /// A single path component mixing literal delimiters and parameters,
    /// e.g. `{file}.{ext}` or `v{version}`
    Composite { parts: Vec<CompositePart> },
}

impl Segment {
    /// True for an optional parameter segment.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Segment::Parameter { optional: true, .. })
    }

    /// True for a catch-all segment.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Segment::CatchAll { .. })
    }

    /// Parameter names declared by this segment, in order of appearance.
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            Segment::Literal { .. } => Vec::new(),
            Segment::Parameter { name, .. } | Segment::CatchAll { name } => vec![name.as_str()],
            Segment::Composite { parts } => parts
                .iter()
                .filter_map(|p| match p {
                    CompositePart::Parameter { name, .. } => Some(name.as_str()),
                    CompositePart::Literal(_) => None,
                })
                .collect(),
        }
    }

    /// Constraint specs declared by this segment, paired with the parameter
    /// name they apply to.
    pub fn constraint_specs(&self) -> Vec<(&str, &ConstraintSpec)> {
        match self {
            Segment::Literal { .. } | Segment::CatchAll { .. } => Vec::new(),
            Segment::Parameter {
                name, constraints, ..
            } => constraints.iter().map(|c| (name.as_str(), c)).collect(),
            Segment::Composite { parts } => parts
                .iter()
                .flat_map(|p| match p {
                    CompositePart::Parameter { name, constraints } => constraints
                        .iter()
                        .map(|c| (name.as_str(), c))
                        .collect::<Vec<_>>(),
                    CompositePart::Literal(_) => Vec::new(),
                })
                .collect(),
        }
    }
}

/// A query-string parameter binding parsed from the `?key={param}` tail of
/// a template.
///
/// Bindings are matched against the request's query parameters, never
/// against path segments, and never participate in specificity ranking.
/// An absent query key simply leaves the parameter unbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    /// Query-string key to look up on the request (e.g. `status`)
    pub key: String,
    /// Parameter name the value binds to
    pub name: String,
    /// Constraints applied to the bound value when present
    pub constraints: Vec<ConstraintSpec>,
}

/// An immutable parsed route template: ordered path segments plus optional
/// query-string bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pub(crate) segments: Vec<Segment>,
    pub(crate) query_bindings: Vec<QueryBinding>,
    pub(crate) raw: String,
}

impl RouteTemplate {
    /// Ordered path segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Query-string bindings attached to the template.
    #[must_use]
    pub fn query_bindings(&self) -> &[QueryBinding] {
        &self.query_bindings
    }

    /// The original template string this was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All parameter names declared by the template (path then query),
    /// in order of appearance.
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .segments
            .iter()
            .flat_map(Segment::parameter_names)
            .collect();
        names.extend(self.query_bindings.iter().map(|b| b.name.as_str()));
        names
    }

    /// True if the template contains no parameters at all.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.query_bindings.is_empty()
            && self
                .segments
                .iter()
                .all(|s| matches!(s, Segment::Literal { .. }))
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
