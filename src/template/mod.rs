//! # Template Module
//!
//! Route template parsing and the parsed segment model.
//!
//! ## Overview
//!
//! A route template is an ordered sequence of path segments with an
//! optional set of query-string bindings:
//!
//! - `Literal` segments match a path component exactly (case-insensitive)
//! - `Parameter` segments consume one component, optionally constrained
//!   (`{id:int}`) or optional (`{id?}`)
//! - `CatchAll` segments (`{**rest}`) consume everything that remains
//! - `Composite` segments mix literal delimiters and parameters inside a
//!   single component (`{file}.{ext}`)
//!
//! Templates are parsed once at registration time and are immutable
//! afterwards. Every structural defect (unbalanced braces, misplaced
//! catch-all, duplicate or reserved parameter names) is a
//! [`ParseError`] raised at parse time, never during matching.
//!
//! ## Example
//!
//! ```rust
//! use wayfinder::template::{RouteTemplate, Segment};
//!
//! let template = RouteTemplate::parse("/reservations/{id:int}")?;
//! assert_eq!(template.segments().len(), 2);
//! assert!(matches!(template.segments()[0], Segment::Literal { .. }));
//! # Ok::<(), wayfinder::template::ParseError>(())
//! ```

mod parser;
mod segment;

pub use parser::ParseError;
pub use segment::{
    is_reserved_name, CompositePart, ConstraintSpec, QueryBinding, RouteTemplate, Segment,
    RESERVED_PARAMETER_NAMES,
};
