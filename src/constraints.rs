//! # Constraints Module
//!
//! Named predicate registry used to narrow which values a route parameter
//! may bind.
//!
//! ## Overview
//!
//! A constraint is a named predicate over the raw (percent-decoded) string
//! value of a parameter. Templates reference constraints by name
//! (`{id:int}`, `{code:regex(^\d+$)}`); the registry resolves each
//! reference to a compiled predicate when the route is added to a table.
//! Referencing an unregistered name fails registration — constraint
//! resolution never fails at match time.
//!
//! Predicates must be side-effect-free and deterministic: the matcher may
//! evaluate them concurrently and in any order.
//!
//! ## Built-in constraints
//!
//! | Name | Meaning |
//! |------|---------|
//! | `int` | parses as a 64-bit signed integer |
//! | `bool` | `true` or `false` (case-insensitive) |
//! | `guid` | canonical 8-4-4-4-12 hex-dash form |
//! | `alpha` | ASCII letters only |
//! | `regex(p)` | full match against `p` |
//! | `minlength(n)` | at least `n` characters |
//! | `maxlength(n)` | at most `n` characters |
//! | `length(n)` / `length(min,max)` | exact or ranged length |
//! | `range(min,max)` | integer within the inclusive range |
//!
//! ## Custom constraints
//!
//! ```rust
//! use wayfinder::constraints::ConstraintRegistry;
//! use std::sync::Arc;
//!
//! let mut registry = ConstraintRegistry::default();
//! registry.register("even", |_args| {
//!     Ok(Arc::new(|value: &str| {
//!         value.parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
//!     }))
//! });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::template::{ConstraintSpec, ParseError};

/// Compiled constraint predicate over a raw parameter value.
pub type ConstraintFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Builds a [`ConstraintFn`] from the argument list written in the
/// template. Invoked once per route at registration time.
pub type ConstraintFactory =
    Arc<dyn Fn(&[String]) -> Result<ConstraintFn, ParseError> + Send + Sync>;

#[allow(clippy::expect_used)]
static GUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("guid pattern is valid")
});

/// Maps constraint names to predicate factories.
///
/// Built once at startup, immutable afterwards; the matcher only ever
/// reads compiled predicates, never the registry itself.
pub struct ConstraintRegistry {
    factories: HashMap<String, ConstraintFactory>,
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ConstraintRegistry {
    /// An empty registry with no constraints at all.
    #[must_use]
    pub fn empty() -> Self {
        ConstraintRegistry {
            factories: HashMap::new(),
        }
    }

    /// A registry pre-populated with the built-in constraints.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register("int", |args| {
            no_arguments("int", args)?;
            Ok(Arc::new(|value: &str| value.parse::<i64>().is_ok()))
        });
        registry.register("bool", |args| {
            no_arguments("bool", args)?;
            Ok(Arc::new(|value: &str| {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }))
        });
        registry.register("guid", |args| {
            no_arguments("guid", args)?;
            Ok(Arc::new(|value: &str| GUID_RE.is_match(value)))
        });
        registry.register("alpha", |args| {
            no_arguments("alpha", args)?;
            Ok(Arc::new(|value: &str| {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
            }))
        });
        registry.register("regex", |args| {
            let pattern = single_argument("regex", args)?;
            let full = format!("^(?:{pattern})$");
            let re = Regex::new(&full).map_err(|e| ParseError::InvalidConstraintArgument {
                name: "regex".to_string(),
                message: e.to_string(),
            })?;
            Ok(Arc::new(move |value: &str| re.is_match(value)))
        });
        registry.register("minlength", |args| {
            exactly_n_arguments("minlength", args, 1)?;
            let min = usize_argument("minlength", args, 0)?;
            Ok(Arc::new(move |value: &str| value.chars().count() >= min))
        });
        registry.register("maxlength", |args| {
            exactly_n_arguments("maxlength", args, 1)?;
            let max = usize_argument("maxlength", args, 0)?;
            Ok(Arc::new(move |value: &str| value.chars().count() <= max))
        });
        registry.register("length", |args| match args.len() {
            1 => {
                let exact = usize_argument("length", args, 0)?;
                Ok(Arc::new(move |value: &str| value.chars().count() == exact) as ConstraintFn)
            }
            2 => {
                let min = usize_argument("length", args, 0)?;
                let max = usize_argument("length", args, 1)?;
                Ok(Arc::new(move |value: &str| {
                    let n = value.chars().count();
                    n >= min && n <= max
                }) as ConstraintFn)
            }
            n => Err(ParseError::InvalidConstraintArgument {
                name: "length".to_string(),
                message: format!("expected 1 or 2 arguments, got {n}"),
            }),
        });
        registry.register("range", |args| {
            exactly_n_arguments("range", args, 2)?;
            let min = int_argument("range", args, 0)?;
            let max = int_argument("range", args, 1)?;
            Ok(Arc::new(move |value: &str| {
                value
                    .parse::<i64>()
                    .map(|n| n >= min && n <= max)
                    .unwrap_or(false)
            }))
        });

        registry
    }

    /// Register a constraint factory under `name`, replacing any previous
    /// registration. Must happen before any route referencing `name` is
    /// added to a table.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&[String]) -> Result<ConstraintFn, ParseError> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    /// Resolve a constraint spec to a compiled predicate.
    ///
    /// # Errors
    ///
    /// `UnknownConstraint` when the name is not registered, or whatever
    /// the factory reports for bad arguments.
    pub fn resolve(&self, spec: &ConstraintSpec) -> Result<ConstraintFn, ParseError> {
        let factory = self
            .factories
            .get(&spec.name.to_ascii_lowercase())
            .ok_or_else(|| ParseError::UnknownConstraint(spec.name.clone()))?;
        factory(&spec.arguments)
    }

    /// True if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }
}

fn no_arguments(name: &str, args: &[String]) -> Result<(), ParseError> {
    exactly_n_arguments(name, args, 0)
}

fn exactly_n_arguments(name: &str, args: &[String], n: usize) -> Result<(), ParseError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(ParseError::InvalidConstraintArgument {
            name: name.to_string(),
            message: format!("expected {} argument(s), got {}", n, args.len()),
        })
    }
}

fn single_argument<'a>(name: &str, args: &'a [String]) -> Result<&'a str, ParseError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(ParseError::InvalidConstraintArgument {
            name: name.to_string(),
            message: format!("expected 1 argument, got {}", args.len()),
        }),
    }
}

fn usize_argument(name: &str, args: &[String], index: usize) -> Result<usize, ParseError> {
    let raw = args
        .get(index)
        .ok_or_else(|| ParseError::InvalidConstraintArgument {
            name: name.to_string(),
            message: format!("missing argument {index}"),
        })?;
    raw.parse::<usize>()
        .map_err(|_| ParseError::InvalidConstraintArgument {
            name: name.to_string(),
            message: format!("`{raw}` is not a non-negative integer"),
        })
}

fn int_argument(name: &str, args: &[String], index: usize) -> Result<i64, ParseError> {
    let raw = args
        .get(index)
        .ok_or_else(|| ParseError::InvalidConstraintArgument {
            name: name.to_string(),
            message: format!("missing argument {index}"),
        })?;
    raw.parse::<i64>()
        .map_err(|_| ParseError::InvalidConstraintArgument {
            name: name.to_string(),
            message: format!("`{raw}` is not an integer"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(registry: &ConstraintRegistry, name: &str, args: &[&str]) -> ConstraintFn {
        let spec = ConstraintSpec::new(name, args.iter().map(|a| a.to_string()).collect());
        registry.resolve(&spec).expect("constraint should resolve")
    }

    #[test]
    fn test_int_constraint() {
        let registry = ConstraintRegistry::default();
        let int = resolve(&registry, "int", &[]);
        assert!(int("123"));
        assert!(int("-5"));
        assert!(!int("1a2"));
        assert!(!int(""));
    }

    #[test]
    fn test_guid_constraint() {
        let registry = ConstraintRegistry::default();
        let guid = resolve(&registry, "guid", &[]);
        assert!(guid("6ec2f2b2-4c63-43cf-9d4c-8a79ed2b5b7e"));
        assert!(!guid("6ec2f2b24c6343cf9d4c8a79ed2b5b7e"));
        assert!(!guid("not-a-guid"));
    }

    #[test]
    fn test_regex_full_match() {
        let registry = ConstraintRegistry::default();
        let re = resolve(&registry, "regex", &[r"\d{3}"]);
        assert!(re("123"));
        assert!(!re("1234"));
        assert!(!re("a123"));
    }

    #[test]
    fn test_length_variants() {
        let registry = ConstraintRegistry::default();
        let exact = resolve(&registry, "length", &["3"]);
        assert!(exact("abc"));
        assert!(!exact("ab"));

        let ranged = resolve(&registry, "length", &["2", "4"]);
        assert!(ranged("ab"));
        assert!(ranged("abcd"));
        assert!(!ranged("a"));
        assert!(!ranged("abcde"));
    }

    #[test]
    fn test_range_constraint() {
        let registry = ConstraintRegistry::default();
        let range = resolve(&registry, "range", &["1", "100"]);
        assert!(range("1"));
        assert!(range("100"));
        assert!(!range("0"));
        assert!(!range("abc"));
    }

    #[test]
    fn test_unknown_constraint() {
        let registry = ConstraintRegistry::default();
        let spec = ConstraintSpec::new("slug", Vec::new());
        assert_eq!(
            registry.resolve(&spec).err(),
            Some(ParseError::UnknownConstraint("slug".to_string()))
        );
    }

    #[test]
    fn test_bad_argument() {
        let registry = ConstraintRegistry::default();
        let spec = ConstraintSpec::new("minlength", vec!["x".to_string()]);
        assert!(matches!(
            registry.resolve(&spec),
            Err(ParseError::InvalidConstraintArgument { .. })
        ));
    }

    #[test]
    fn test_missing_argument_reports_count() {
        let registry = ConstraintRegistry::default();
        let spec = ConstraintSpec::new("minlength", Vec::new());
        let err = registry
            .resolve(&spec)
            .err()
            .expect("zero arguments must fail");
        match err {
            ParseError::InvalidConstraintArgument { name, message } => {
                assert_eq!(name, "minlength");
                assert_eq!(message, "expected 1 argument(s), got 0");
            }
            other => panic!("expected argument-count error, got {other:?}"),
        }
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let registry = ConstraintRegistry::default();
        assert!(registry.contains("int"));
        assert!(registry.contains("INT"));
        assert!(!registry.contains("slug"));
        assert!(!ConstraintRegistry::empty().contains("int"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ConstraintRegistry::default();
        registry.register("even", |_args| {
            Ok(Arc::new(|value: &str| {
                value.parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
            }))
        });
        let even = resolve(&registry, "even", &[]);
        assert!(even("4"));
        assert!(!even("3"));
    }
}
