use super::{FormatNegotiator, RouteResolver};
use crate::config::{ErrorType, Format, FormatTable, Route, RouteTable};
use http::StatusCode;

fn scenario_table() -> RouteTable {
    vec![
        ("", Route::default()),
        (
            "AcmeNotFound",
            Route {
                controller: Some("NotFound".to_string()),
                http_status: Some(StatusCode::NOT_FOUND),
                format: Some("text/html".to_string()),
                ..Route::default()
            },
        ),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_exact_match_wins() {
    let table = scenario_table();
    let route = RouteResolver::new(&table)
        .resolve_with_defaults("AcmeNotFound", None, "html")
        .unwrap();
    assert_eq!(route.http_status, Some(StatusCode::NOT_FOUND));
    assert_eq!(route.format.as_deref(), Some("text/html"));
    assert_eq!(route.controller.as_deref(), Some("NotFound"));
}

#[test]
fn test_unrouted_type_gets_defaulted_default() {
    let table = scenario_table();
    let route = RouteResolver::new(&table)
        .resolve_with_defaults("Other", None, "html")
        .unwrap();
    assert_eq!(route.http_status, Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(route.format.as_deref(), Some("html"));
    assert_eq!(route.error_type, Some(ErrorType::None));
    assert!(route.controller.is_none());
}

#[test]
fn test_every_present_key_resolves_to_itself() {
    let table = scenario_table();
    let resolver = RouteResolver::new(&table);
    for (key, route) in table.iter() {
        assert_eq!(resolver.resolve(key).unwrap(), route);
    }
}

#[test]
fn test_no_hierarchy_matching() {
    let table = scenario_table();
    let resolver = RouteResolver::new(&table);
    // a name that merely extends a routed one is still unrouted
    let route = resolver.resolve("AcmeNotFoundSubtype").unwrap();
    assert_eq!(route, table.default_route().unwrap());
}

#[test]
fn test_missing_default_route() {
    let table: RouteTable = vec![("AcmeNotFound", Route::default())].into_iter().collect();
    let err = RouteResolver::new(&table).resolve("Other").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("default route missing"));
}

#[test]
fn test_override_format_beats_default() {
    let table = scenario_table();
    let route = RouteResolver::new(&table)
        .resolve_with_defaults("Other", Some("json"), "html")
        .unwrap();
    assert_eq!(route.format.as_deref(), Some("json"));
}

#[test]
fn test_defaulting_is_idempotent() {
    let routes = [
        Route::default(),
        Route {
            http_status: Some(StatusCode::BAD_REQUEST),
            ..Route::default()
        },
        Route {
            format: Some("json".to_string()),
            error_type: Some(ErrorType::Client),
            ..Route::default()
        },
    ];
    for route in routes {
        let once = RouteResolver::apply_defaults(route, Some("xml"), "html");
        let twice = RouteResolver::apply_defaults(once.clone(), Some("xml"), "html");
        assert_eq!(once, twice);
    }
}

fn formats() -> FormatTable {
    vec![Format::new("html", "text/html", "HtmlResolver")]
        .into_iter()
        .collect()
}

#[test]
fn test_format_exact_match() {
    let table = formats();
    let format = FormatNegotiator::new(&table).resolve(Some("html"), "html").unwrap();
    assert_eq!(format.content_type, "text/html");
}

#[test]
fn test_format_falls_back_to_default() {
    let table = formats();
    let format = FormatNegotiator::new(&table).resolve(Some("json"), "html").unwrap();
    assert_eq!(format.name, "html");
    let no_request = FormatNegotiator::new(&table).resolve(None, "html").unwrap();
    assert_eq!(no_request.name, "html");
}

#[test]
fn test_format_missing_default() {
    let table = formats();
    let err = FormatNegotiator::new(&table).resolve(Some("json"), "xml").unwrap_err();
    assert!(err.to_string().contains("default format matches no resolver"));
}
