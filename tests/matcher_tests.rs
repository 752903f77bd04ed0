use http::Method;
use wayfinder::{ConstraintRegistry, MatchOutcome, Matcher, RouteDef, RouteTable};

fn build_matcher(defs: &[(&str, &str, &str)]) -> Matcher {
    let registry = ConstraintRegistry::default();
    let mut table = RouteTable::new();
    for (pattern, method, handler) in defs {
        table
            .add(&registry, RouteDef::new(*pattern, *method, *handler))
            .expect("route should register");
    }
    Matcher::new(table)
}

fn assert_route_match(matcher: &Matcher, method: Method, path: &str, expected_handler: &str) {
    let outcome = matcher.match_route(&method, path, &[]);
    match outcome {
        MatchOutcome::Matched(m) => {
            assert_eq!(
                m.route.handler_name, expected_handler,
                "Handler mismatch for {} {}: expected '{}', got '{}'",
                method, path, expected_handler, m.route.handler_name
            );
        }
        other => {
            assert_eq!(
                expected_handler, "<none>",
                "Expected {expected_handler} to match for {method} {path}, got {other:?}"
            );
        }
    }
}

#[test]
fn test_literal_only_template() {
    let matcher = build_matcher(&[
        ("/reservations/list", "GET", "list"),
        ("/reservations/export", "GET", "export"),
    ]);
    let outcome = matcher.match_route(&Method::GET, "/reservations/list", &[]);
    let matched = outcome.matched().expect("literal route should match");
    assert_eq!(matched.route.handler_name, "list");
    assert!(matched.params.is_empty());
}

#[test]
fn test_unconstrained_parameter_verbatim() {
    let matcher = build_matcher(&[("/reservations/{id}", "GET", "by_id")]);
    let outcome = matcher.match_route(&Method::GET, "/reservations/ab%2Fcd", &[]);
    let matched = outcome.matched().expect("route should match");
    assert_eq!(matched.get_param("id"), Some("ab/cd"));
}

#[test]
fn test_reservations_disambiguation() {
    let matcher = build_matcher(&[
        ("/Reservations/{id:alpha}", "GET", "by_code"),
        ("/Reservations/{id:int}", "GET", "by_number"),
        ("/Reservations/List", "GET", "list"),
    ]);

    assert_route_match(&matcher, Method::GET, "/Reservations/List", "list");
    assert_route_match(&matcher, Method::GET, "/Reservations/abcde", "by_code");
    assert_route_match(&matcher, Method::GET, "/Reservations/123", "by_number");

    // Fails both constraints; two structural candidates remain, so the
    // outcome is an ordinary no-match rather than a violation.
    let outcome = matcher.match_route(&Method::GET, "/Reservations/1a2", &[]);
    assert!(outcome.is_no_match(), "expected NoMatch, got {outcome:?}");
}

#[test]
fn test_sole_candidate_constraint_violation() {
    let matcher = build_matcher(&[("/reservations/{id:int}", "GET", "by_number")]);
    let outcome = matcher.match_route(&Method::GET, "/reservations/abc", &[]);
    match outcome {
        MatchOutcome::ConstraintViolation {
            constraint,
            parameter,
            ..
        } => {
            assert_eq!(constraint, "int");
            assert_eq!(parameter, "id");
        }
        other => panic!("expected ConstraintViolation, got {other:?}"),
    }
}

#[test]
fn test_reserved_name_rejected_at_registration() {
    let registry = ConstraintRegistry::default();
    let mut table = RouteTable::new();
    let err = table
        .add(&registry, RouteDef::new("/x/{controller}", "GET", "h"))
        .expect_err("reserved name must fail registration");
    assert_eq!(
        err,
        wayfinder::ParseError::ReservedName("controller".to_string())
    );
}

#[test]
fn test_catch_all_extraction() {
    let matcher = build_matcher(&[("/Reservations/{id}/{**rest}", "GET", "tail")]);
    let outcome = matcher.match_route(&Method::GET, "/Reservations/123/a/b/c", &[]);
    let matched = outcome.matched().expect("catch-all route should match");
    assert_eq!(matched.get_param("id"), Some("123"));
    assert_eq!(matched.get_param("rest"), Some("a/b/c"));
}

#[test]
fn test_optional_parameter_both_arms() {
    let matcher = build_matcher(&[("/Reservations/{id?}", "GET", "maybe_id")]);

    let shorter = matcher.match_route(&Method::GET, "/Reservations", &[]);
    let matched = shorter.matched().expect("shorter path should match");
    assert_eq!(matched.get_param("id"), None);

    let longer = matcher.match_route(&Method::GET, "/Reservations/123", &[]);
    let matched = longer.matched().expect("longer path should match");
    assert_eq!(matched.get_param("id"), Some("123"));
}

#[test]
fn test_equal_specificity_is_ambiguous() {
    let matcher = build_matcher(&[
        ("/orders/{id}", "GET", "first"),
        ("/orders/{number}", "GET", "second"),
    ]);
    let outcome = matcher.match_route(&Method::GET, "/orders/42", &[]);
    match outcome {
        MatchOutcome::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
        other => panic!("expected Ambiguous, got {other:?}"),
    }
}

#[test]
fn test_constraint_breaks_tie() {
    let matcher = build_matcher(&[
        ("/orders/{id:int}", "GET", "numeric"),
        ("/orders/{name}", "GET", "named"),
    ]);
    assert_route_match(&matcher, Method::GET, "/orders/42", "numeric");
    assert_route_match(&matcher, Method::GET, "/orders/pending", "named");
}

#[test]
fn test_literal_outranks_parameter_outranks_catch_all() {
    let matcher = build_matcher(&[
        ("/docs/index", "GET", "index"),
        ("/docs/{page}", "GET", "page"),
        ("/docs/{**path}", "GET", "fallback"),
    ]);
    assert_route_match(&matcher, Method::GET, "/docs/index", "index");
    assert_route_match(&matcher, Method::GET, "/docs/guide", "page");
    assert_route_match(&matcher, Method::GET, "/docs/guide/part/2", "fallback");
}

#[test]
fn test_no_match_for_unmapped_path() {
    let matcher = build_matcher(&[("/pets/{id}", "GET", "get_pet")]);
    assert_route_match(&matcher, Method::GET, "/does/not/exist", "<none>");
}

#[test]
fn test_matching_is_deterministic() {
    let matcher = build_matcher(&[
        ("/reservations/list", "GET", "list"),
        ("/reservations/{id:int}", "GET", "by_number"),
        ("/reservations/{**rest}", "GET", "fallback"),
    ]);
    let first = matcher.match_route(&Method::GET, "/reservations/99", &[]);
    let first_handler = first.matched().map(|m| m.route.handler_name.clone());
    for _ in 0..50 {
        let again = matcher.match_route(&Method::GET, "/reservations/99", &[]);
        assert_eq!(
            again.matched().map(|m| m.route.handler_name.clone()),
            first_handler
        );
    }
}

#[test]
fn test_registration_order_is_irrelevant() {
    let defs = [
        ("/Reservations/{id:alpha}", "GET", "by_code"),
        ("/Reservations/{id:int}", "GET", "by_number"),
        ("/Reservations/List", "GET", "list"),
    ];
    let forward = build_matcher(&defs);
    let mut reversed = defs;
    reversed.reverse();
    let backward = build_matcher(&reversed);

    for path in ["/Reservations/List", "/Reservations/abcde", "/Reservations/123"] {
        let a = forward.match_route(&Method::GET, path, &[]);
        let b = backward.match_route(&Method::GET, path, &[]);
        assert_eq!(
            a.matched().map(|m| m.route.handler_name.clone()),
            b.matched().map(|m| m.route.handler_name.clone()),
            "order-dependent outcome for {path}"
        );
    }
}

#[test]
fn test_custom_constraint() {
    let mut registry = ConstraintRegistry::default();
    registry.register("even", |_args| {
        Ok(std::sync::Arc::new(|value: &str| {
            value.parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
        }))
    });

    let mut table = RouteTable::new();
    table
        .add(&registry, RouteDef::new("/slots/{n:even}", "GET", "even_slot"))
        .expect("route should register");
    let matcher = Matcher::new(table);

    assert!(matcher
        .match_route(&Method::GET, "/slots/4", &[])
        .matched()
        .is_some());
    assert!(matches!(
        matcher.match_route(&Method::GET, "/slots/3", &[]),
        MatchOutcome::ConstraintViolation { .. }
    ));
}

#[test]
fn test_unknown_constraint_fails_registration() {
    let registry = ConstraintRegistry::default();
    let mut table = RouteTable::new();
    let err = table
        .add(&registry, RouteDef::new("/x/{id:slug}", "GET", "h"))
        .expect_err("unknown constraint must fail registration");
    assert_eq!(err, wayfinder::ParseError::UnknownConstraint("slug".to_string()));
}
