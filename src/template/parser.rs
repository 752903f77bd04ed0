//! Route template parsing.
//!
//! Turns a template string like `/files/{dir}/{name}.{ext}/{**rest}?status={status}`
//! into an immutable [`RouteTemplate`]. All structural errors are raised
//! here, at registration time; matching never fails on template shape.

use std::collections::HashSet;

use thiserror::Error;

use super::segment::{
    is_reserved_name, CompositePart, ConstraintSpec, QueryBinding, RouteTemplate, Segment,
};

/// Errors raised while parsing a route template or resolving its
/// constraints at registration time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("duplicate parameter name `{0}`")]
    DuplicateParameter(String),
    #[error("parameter name `{0}` is reserved")]
    ReservedName(String),
    #[error("catch-all parameter `{0}` must be the final segment of the template")]
    MisplacedCatchAll(String),
    #[error("optional parameter `{0}` may only be followed by other optional parameters")]
    MisplacedOptional(String),
    #[error("unbalanced braces in `{0}`")]
    UnbalancedBraces(String),
    #[error("empty parameter name in `{0}`")]
    EmptyParameterName(String),
    #[error("invalid query binding `{0}`, expected `key={{param}}`")]
    InvalidQueryBinding(String),
    #[error("adjacent parameters without a literal delimiter in `{0}`")]
    AdjacentParameters(String),
    #[error("unknown constraint `{0}`")]
    UnknownConstraint(String),
    #[error("invalid argument for constraint `{name}`: {message}")]
    InvalidConstraintArgument { name: String, message: String },
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),
}

/// Intermediate form of one `{...}` reference before it is classified as a
/// plain parameter, a catch-all or a composite part.
struct ParamRef {
    name: String,
    constraints: Vec<ConstraintSpec>,
    optional: bool,
    catch_all: bool,
}

impl RouteTemplate {
    /// Parse a template string into a [`RouteTemplate`].
    ///
    /// Recognizes literal components, `{name}`, `{name?}`, `{**name}`,
    /// `{name:c1:c2(args)}`, composite components such as `{file}.{ext}`,
    /// and a query-binding tail such as `?status={status}`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first structural defect
    /// found. Constraint names are not resolved here; unknown names are
    /// reported when the template is added to a
    /// [`RouteTable`](crate::table::RouteTable).
    pub fn parse(raw: &str) -> Result<RouteTemplate, ParseError> {
        let (path_part, query_part) = match raw.split_once('?') {
            // A '?' inside braces belongs to an optional parameter, not the
            // query tail, so only split on a '?' at brace depth zero.
            Some(_) => split_query_tail(raw),
            None => (raw, None),
        };

        let mut segments = Vec::new();
        for component in path_part.split('/').filter(|c| !c.is_empty()) {
            segments.push(parse_component(component)?);
        }

        let query_bindings = match query_part {
            Some(q) => parse_query_bindings(q)?,
            None => Vec::new(),
        };

        let template = RouteTemplate {
            segments,
            query_bindings,
            raw: raw.to_string(),
        };
        validate(&template)?;
        Ok(template)
    }
}

/// Split `raw` into path and query tail at the first `?` that sits outside
/// of braces.
fn split_query_tail(raw: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, ch) in raw.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '?' if depth == 0 => return (&raw[..i], Some(&raw[i + 1..])),
            _ => {}
        }
    }
    (raw, None)
}

/// Parse one path component into a segment.
fn parse_component(component: &str) -> Result<Segment, ParseError> {
    let mut parts: Vec<CompositePart> = Vec::new();
    let mut refs: Vec<ParamRef> = Vec::new();
    let mut literal = String::new();
    let bytes = component.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if !literal.is_empty() {
                    parts.push(CompositePart::Literal(std::mem::take(&mut literal)));
                }
                let close = find_closing_brace(component, i)?;
                let inner = &component[i + 1..close];
                let param = parse_parameter(component, inner)?;
                parts.push(CompositePart::Parameter {
                    name: param.name.clone(),
                    constraints: param.constraints.clone(),
                });
                refs.push(param);
                i = close + 1;
            }
            b'}' => return Err(ParseError::UnbalancedBraces(component.to_string())),
            _ => {
                // Path components are percent-decoded before matching, so
                // multi-byte characters only ever appear inside literals.
                let ch_len = utf8_len(bytes[i]);
                literal.push_str(&component[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    if !literal.is_empty() {
        parts.push(CompositePart::Literal(literal));
    }

    match (parts.len(), refs.len()) {
        // Pure literal component
        (1, 0) => match parts.remove(0) {
            CompositePart::Literal(text) => Ok(Segment::Literal { text }),
            CompositePart::Parameter { .. } => Err(ParseError::UnbalancedBraces(
                component.to_string(),
            )),
        },
        // Single parameter spanning the whole component
        (1, 1) => {
            let param = refs.remove(0);
            if param.catch_all {
                Ok(Segment::CatchAll { name: param.name })
            } else {
                Ok(Segment::Parameter {
                    name: param.name,
                    constraints: param.constraints,
                    optional: param.optional,
                })
            }
        }
        // Mixed literal/parameter component
        _ => {
            let adjacent = parts
                .windows(2)
                .any(|w| {
                    matches!(w[0], CompositePart::Parameter { .. })
                        && matches!(w[1], CompositePart::Parameter { .. })
                });
            if adjacent {
                return Err(ParseError::AdjacentParameters(component.to_string()));
            }
            for param in &refs {
                if param.catch_all {
                    return Err(ParseError::MisplacedCatchAll(param.name.clone()));
                }
                if param.optional {
                    return Err(ParseError::MisplacedOptional(param.name.clone()));
                }
            }
            Ok(Segment::Composite { parts })
        }
    }
}

/// Locate the `}` closing the brace at byte offset `open`.
///
/// Braces inside parentheses are treated literally so `regex(\d{3})`
/// style constraint arguments survive intact.
fn find_closing_brace(component: &str, open: usize) -> Result<usize, ParseError> {
    let bytes = component.as_bytes();
    let mut paren_depth = 0usize;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'{' if paren_depth == 0 => {
                return Err(ParseError::UnbalancedBraces(component.to_string()))
            }
            b'}' if paren_depth == 0 => return Ok(i),
            _ => {}
        }
        i += 1;
    }
    Err(ParseError::UnbalancedBraces(component.to_string()))
}

/// Parse the text between braces: `[**]name[?][:constraint...]`.
fn parse_parameter(component: &str, inner: &str) -> Result<ParamRef, ParseError> {
    let (catch_all, rest) = match inner.strip_prefix("**") {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let tokens = split_top_level(rest, ':');
    let mut name = tokens
        .first()
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let optional = if let Some(stripped) = name.strip_suffix('?') {
        let stripped = stripped.to_string();
        name = stripped;
        true
    } else {
        false
    };
    // `{id:int?}` puts the marker after the constraint list
    let mut tokens: Vec<String> = tokens.into_iter().skip(1).collect();
    let optional = match tokens.last().map(|t| t.ends_with('?')) {
        Some(true) => {
            if let Some(last) = tokens.last_mut() {
                last.truncate(last.len() - 1);
            }
            true
        }
        _ => optional,
    };

    if name.is_empty() {
        return Err(ParseError::EmptyParameterName(component.to_string()));
    }
    if catch_all && optional {
        return Err(ParseError::MisplacedOptional(name));
    }

    let mut constraints = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        constraints.push(parse_constraint_token(component, token)?);
    }
    if catch_all && !constraints.is_empty() {
        // Catch-all values span multiple components; constraints on them
        // are not supported.
        return Err(ParseError::MisplacedCatchAll(name));
    }

    Ok(ParamRef {
        name,
        constraints,
        optional,
        catch_all,
    })
}

/// Parse one constraint token: `name` or `name(args)`.
fn parse_constraint_token(component: &str, token: &str) -> Result<ConstraintSpec, ParseError> {
    match token.find('(') {
        None => Ok(ConstraintSpec::new(token, Vec::new())),
        Some(open) => {
            if !token.ends_with(')') {
                return Err(ParseError::UnbalancedBraces(component.to_string()));
            }
            let name = &token[..open];
            let args_text = &token[open + 1..token.len() - 1];
            if name.is_empty() {
                return Err(ParseError::EmptyParameterName(component.to_string()));
            }
            // A regex pattern may contain `,`, `:` and `{n,m}` quantifiers,
            // so it is taken verbatim as a single argument.
            let arguments = if name.eq_ignore_ascii_case("regex") {
                vec![args_text.to_string()]
            } else {
                args_text
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect()
            };
            Ok(ConstraintSpec::new(name, arguments))
        }
    }
}

/// Split `text` on `sep` occurrences outside of parentheses.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut paren_depth = 0usize;
    for ch in text.chars() {
        match ch {
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth.saturating_sub(1);
                current.push(ch);
            }
            c if c == sep && paren_depth == 0 => out.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    out.push(current);
    out
}

/// Parse the query tail: `key={param}&other={p2:int}`.
fn parse_query_bindings(query: &str) -> Result<Vec<QueryBinding>, ParseError> {
    let mut bindings = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ParseError::InvalidQueryBinding(pair.to_string()))?;
        let inner = value
            .strip_prefix('{')
            .and_then(|v| v.strip_suffix('}'))
            .ok_or_else(|| ParseError::InvalidQueryBinding(pair.to_string()))?;
        let param = parse_parameter(pair, inner)?;
        if param.catch_all {
            return Err(ParseError::InvalidQueryBinding(pair.to_string()));
        }
        if key.is_empty() {
            return Err(ParseError::InvalidQueryBinding(pair.to_string()));
        }
        bindings.push(QueryBinding {
            key: key.to_string(),
            name: param.name,
            constraints: param.constraints,
        });
    }
    Ok(bindings)
}

/// Cross-segment invariants: unique names, no reserved names, catch-all
/// last, optionals only in the trailing run.
fn validate(template: &RouteTemplate) -> Result<(), ParseError> {
    let mut seen: HashSet<String> = HashSet::new();
    for name in template.parameter_names() {
        if is_reserved_name(name) {
            return Err(ParseError::ReservedName(name.to_string()));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(ParseError::DuplicateParameter(name.to_string()));
        }
    }

    let last = template.segments.len().saturating_sub(1);
    let mut optional_seen = false;
    for (i, segment) in template.segments.iter().enumerate() {
        if let Segment::CatchAll { name } = segment {
            if i != last {
                return Err(ParseError::MisplacedCatchAll(name.clone()));
            }
        }
        if optional_seen && !segment.is_optional() {
            let name = match segment {
                Segment::Literal { text } => text.clone(),
                other => other
                    .parameter_names()
                    .first()
                    .map(|n| (*n).to_string())
                    .unwrap_or_else(|| template.raw.clone()),
            };
            return Err(ParseError::MisplacedOptional(name));
        }
        if segment.is_optional() {
            optional_seen = true;
        }
    }
    Ok(())
}

/// Length in bytes of the UTF-8 character starting with `byte`.
fn utf8_len(byte: u8) -> usize {
    match byte {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> RouteTemplate {
        RouteTemplate::parse(raw).expect("template should parse")
    }

    #[test]
    fn test_literal_only() {
        let t = parse("/reservations/list");
        assert_eq!(t.segments().len(), 2);
        assert!(t.is_static());
    }

    #[test]
    fn test_parameter_with_constraints() {
        let t = parse("/reservations/{id:int:range(1,100)}");
        match &t.segments()[1] {
            Segment::Parameter {
                name,
                constraints,
                optional,
            } => {
                assert_eq!(name, "id");
                assert!(!optional);
                assert_eq!(constraints.len(), 2);
                assert_eq!(constraints[0].name, "int");
                assert_eq!(constraints[1].name, "range");
                assert_eq!(constraints[1].arguments, vec!["1", "100"]);
            }
            other => panic!("expected parameter segment, got {other:?}"),
        }
    }

    #[test]
    fn test_regex_argument_kept_verbatim() {
        let t = parse(r"/codes/{code:regex(^\d{2,4}:[a-z]+$)}");
        match &t.segments()[1] {
            Segment::Parameter { constraints, .. } => {
                assert_eq!(constraints[0].arguments, vec![r"^\d{2,4}:[a-z]+$"]);
            }
            other => panic!("expected parameter segment, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_marker_after_constraint() {
        let t = parse("/reservations/{id:int?}");
        assert!(t.segments()[1].is_optional());
    }

    #[test]
    fn test_composite_component() {
        let t = parse("/files/{name}.{ext}");
        match &t.segments()[1] {
            Segment::Composite { parts } => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[1], CompositePart::Literal(".".to_string()));
            }
            other => panic!("expected composite segment, got {other:?}"),
        }
    }

    #[test]
    fn test_query_binding() {
        let t = parse("/reservations?status={status:alpha}");
        assert_eq!(t.query_bindings().len(), 1);
        assert_eq!(t.query_bindings()[0].key, "status");
        assert_eq!(t.query_bindings()[0].name, "status");
        assert_eq!(t.query_bindings()[0].constraints[0].name, "alpha");
    }

    #[test]
    fn test_optional_marker_not_query_split() {
        // The `?` in `{id?}` must not be mistaken for a query tail.
        let t = parse("/reservations/{id?}");
        assert!(t.query_bindings().is_empty());
        assert!(t.segments()[1].is_optional());
    }

    #[test]
    fn test_catch_all_must_be_last() {
        assert_eq!(
            RouteTemplate::parse("/a/{**rest}/b"),
            Err(ParseError::MisplacedCatchAll("rest".to_string()))
        );
    }

    #[test]
    fn test_optional_must_be_trailing() {
        assert_eq!(
            RouteTemplate::parse("/a/{b?}/c"),
            Err(ParseError::MisplacedOptional("c".to_string()))
        );
    }

    #[test]
    fn test_duplicate_parameter() {
        assert_eq!(
            RouteTemplate::parse("/a/{id}/b/{id}"),
            Err(ParseError::DuplicateParameter("id".to_string()))
        );
    }

    #[test]
    fn test_reserved_name() {
        assert_eq!(
            RouteTemplate::parse("/x/{controller}"),
            Err(ParseError::ReservedName("controller".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            RouteTemplate::parse("/a/{id"),
            Err(ParseError::UnbalancedBraces(_))
        ));
        assert!(matches!(
            RouteTemplate::parse("/a/id}"),
            Err(ParseError::UnbalancedBraces(_))
        ));
        assert!(matches!(
            RouteTemplate::parse("/a/{i{d}}"),
            Err(ParseError::UnbalancedBraces(_))
        ));
    }

    #[test]
    fn test_empty_parameter_name() {
        assert!(matches!(
            RouteTemplate::parse("/a/{}"),
            Err(ParseError::EmptyParameterName(_))
        ));
    }
}
