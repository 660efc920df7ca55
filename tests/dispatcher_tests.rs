//! Tests for the front controller pipeline
//!
//! # Test Coverage
//!
//! - Route resolution end to end: exact match, default route, route format
//! - Reporter ordering and independence
//! - Hand-off to the emergency handler before components run, and re-arming
//!   after a committed response
//! - Controller body and redirect short-circuits
//! - Every failure class ending in the emergency handler with the partial
//!   response discarded

mod common;

use common::components::{self, Journal};
use common::fixtures::{Project, DOCUMENT};
use faultroute::dispatcher::{FrontController, PipelineState};
use faultroute::fault::Fault;
use faultroute::handler::{EmergencyHandler, ErrorHandler, HandlerRegistry};
use faultroute::response::{BufferTransport, Transport};
use faultroute::runtime_config::RuntimeConfig;
use http::StatusCode;
use std::sync::Arc;

struct Harness {
    _project: Project,
    journal: Journal,
    transport: Arc<BufferTransport>,
    emergency: Arc<EmergencyHandler>,
    registry: HandlerRegistry,
    controller: Arc<FrontController>,
}

impl Harness {
    fn controller_installed(&self) -> bool {
        self.registry
            .is_current(&(Arc::clone(&self.controller) as Arc<dyn ErrorHandler>))
    }

    fn emergency_installed(&self) -> bool {
        self.registry
            .is_current(&(Arc::clone(&self.emergency) as Arc<dyn ErrorHandler>))
    }
}

fn harness_with(document: &str, env: &str, failing: &[&str], display_format: Option<&str>) -> Harness {
    let project = Project::new();
    let doc = project.write("errors.yaml", document);
    let journal = Journal::default();
    let transport = Arc::new(BufferTransport::new());
    let emergency = Arc::new(
        EmergencyHandler::new(Arc::clone(&transport) as Arc<dyn Transport>).with_display_errors(true),
    );
    let emergency_dyn: Arc<dyn ErrorHandler> = Arc::clone(&emergency) as Arc<dyn ErrorHandler>;
    let registry = HandlerRegistry::new();
    let components = components::registry(
        &journal,
        failing,
        Some((registry.clone(), Arc::clone(&emergency_dyn))),
    );

    let mut runtime = RuntimeConfig::new(doc, env);
    if let Some(format) = display_format {
        runtime = runtime.with_display_format(format);
    }
    let controller = FrontController::builder(
        registry.clone(),
        Arc::clone(&transport) as Arc<dyn Transport>,
    )
    .runtime(runtime)
    .components(Arc::new(components))
    .emergency(emergency_dyn)
    .arm();

    Harness {
        _project: project,
        journal,
        transport,
        emergency,
        registry,
        controller,
    }
}

fn harness() -> Harness {
    harness_with(DOCUMENT, "local", &[], None)
}

#[test]
fn test_arm_installs_controller() {
    let h = harness();
    assert_eq!(h.controller.state(), PipelineState::Armed);
    assert!(h.controller_installed());
}

#[test]
fn test_routed_fault_renders_view() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));

    let sent = h.transport.last().unwrap();
    assert_eq!(sent.status, StatusCode::NOT_FOUND);
    assert_eq!(sent.header("Content-Type"), Some("text/html; charset=UTF-8"));
    assert_eq!(sent.body_str(), "view=views/404");
    assert_eq!(h.emergency.handled(), 0);
}

#[test]
fn test_unrouted_fault_uses_default_route() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::SomethingElse", "boom"));

    let sent = h.transport.last().unwrap();
    assert_eq!(sent.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(sent.body_str(), "view=views/500");
}

#[test]
fn test_reporters_run_in_order_after_handoff() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));
    assert_eq!(
        h.journal.entries(),
        vec![
            "emergency-installed:true",
            "emergency-installed:true",
            "first:app::NotFound",
            "second:app::NotFound",
        ]
    );
}

#[test]
fn test_two_faults_in_sequence_rearm() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::NotFound", "one"));
    assert!(h.controller_installed());
    assert_eq!(h.controller.state(), PipelineState::Armed);

    h.registry.dispatch(Fault::new("app::Teapot", "two"));
    assert!(h.controller_installed());
    assert_eq!(h.transport.count(), 2);
    assert_eq!(h.emergency.handled(), 0);

    let statuses: Vec<_> = h.transport.sent().iter().map(|s| s.status.as_u16()).collect();
    assert_eq!(statuses, vec![404, 418]);
}

#[test]
fn test_environment_without_reporters() {
    let h = harness_with(DOCUMENT, "live", &[], None);
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));
    assert!(h.journal.entries().is_empty());
    assert_eq!(h.transport.last().unwrap().status, StatusCode::NOT_FOUND);
}

#[test]
fn test_failing_reporter_goes_to_emergency_handler() {
    let h = harness_with(DOCUMENT, "local", &["first"], None);
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));

    // the second reporter still ran
    let entries = h.journal.entries();
    assert!(entries.contains(&"first:app::NotFound".to_string()));
    assert!(entries.contains(&"second:app::NotFound".to_string()));

    // only the emergency response was sent
    assert_eq!(h.transport.count(), 1);
    let sent = h.transport.last().unwrap();
    assert_eq!(sent.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(sent.header("Content-Type"), Some("text/plain; charset=UTF-8"));
    assert!(sent.body_str().contains("faultroute::ReporterError"));
    assert!(sent.body_str().contains("first reporter storage unavailable"));

    assert_eq!(h.emergency.handled(), 1);
    assert_eq!(h.controller.state(), PipelineState::Failed);
    assert!(h.emergency_installed());
}

#[test]
fn test_spent_controller_forwards_until_rearmed() {
    let h = harness_with(DOCUMENT, "local", &["second"], None);
    h.registry.dispatch(Fault::new("app::NotFound", "first fault"));
    assert_eq!(h.emergency.handled(), 1);

    // called directly while spent: no pipeline, straight to the emergency handler
    h.controller.handle(Fault::new("app::NotFound", "second fault"));
    assert_eq!(h.emergency.handled(), 2);
    assert_eq!(h.journal.entries().len(), 4);

    assert!(h.controller.rearm());
    assert!(h.controller_installed());
    assert_eq!(h.controller.state(), PipelineState::Armed);
}

#[test]
fn test_controller_body_skips_resolver() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::Teapot", "short and stout"));

    let sent = h.transport.last().unwrap();
    assert_eq!(sent.status.as_u16(), 418);
    assert_eq!(sent.body_str(), "I'm a teapot");
    assert_eq!(sent.header("X-Teapot"), Some("short and stout"));
}

#[test]
fn test_redirect_commits_without_body() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::Moved", "gone"));

    let sent = h.transport.last().unwrap();
    assert_eq!(sent.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(sent.header("Location"), Some("/moved-here"));
    assert_eq!(sent.header("Cache-Control"), Some("no-cache, no-store, must-revalidate"));
    assert_eq!(sent.body_str(), "");
}

#[test]
fn test_route_format_selects_resolver_and_content_type() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::Api", "bad input"));

    let sent = h.transport.last().unwrap();
    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
    assert_eq!(sent.header("Content-Type"), Some("application/json"));
    assert_eq!(sent.body_str(), "view=-");
}

#[test]
fn test_display_format_overrides_route() {
    let h = harness_with(DOCUMENT, "local", &[], Some("json"));
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));
    assert_eq!(
        h.transport.last().unwrap().header("Content-Type"),
        Some("application/json")
    );
}

#[test]
fn test_unknown_display_format_falls_back_to_default() {
    let h = harness_with(DOCUMENT, "local", &[], Some("xml"));
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));
    let sent = h.transport.last().unwrap();
    assert_eq!(sent.header("Content-Type"), Some("text/html; charset=UTF-8"));
    assert_eq!(h.emergency.handled(), 0);
}

#[test]
fn test_capability_mismatch_is_configuration_error() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::Misrouted", "x"));

    assert_eq!(h.emergency.handled(), 1);
    let body = h.transport.last().unwrap().body_str();
    assert!(body.contains("faultroute::ConfigurationError"));
    assert!(body.contains("tests::Echo"));
}

#[test]
fn test_missing_controller_is_component_not_found() {
    let document = DOCUMENT.replace("controller: tests::Teapot", "controller: tests::Ghost");
    let h = harness_with(&document, "local", &[], None);
    h.registry.dispatch(Fault::new("app::Teapot", "x"));

    let body = h.transport.last().unwrap().body_str();
    assert!(body.contains("faultroute::ComponentNotFoundError"));
    assert!(body.contains("Ghost"));
}

#[test]
fn test_panicking_controller_is_caught() {
    let h = harness();
    h.registry.dispatch(Fault::new("app::Exploding", "x"));

    assert_eq!(h.controller.state(), PipelineState::Failed);
    let body = h.transport.last().unwrap().body_str();
    assert!(body.contains("faultroute::PanicError"));
    assert!(body.contains("controller blew up"));
    assert_eq!(h.transport.count(), 1);
}

#[test]
fn test_missing_document_goes_to_emergency_handler() {
    let transport = Arc::new(BufferTransport::new());
    let registry = HandlerRegistry::new();
    let controller = FrontController::builder(
        registry.clone(),
        Arc::clone(&transport) as Arc<dyn Transport>,
    )
    .runtime(RuntimeConfig::new("/definitely/not/here.yaml", "local"))
    .arm();

    registry.dispatch(Fault::new("app::NotFound", "/nope"));
    assert_eq!(controller.state(), PipelineState::Failed);

    // the default emergency handler hides details
    let sent = transport.last().unwrap();
    assert_eq!(sent.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(sent.body_str(), "");
}

#[test]
fn test_lazily_loaded_environment_enables_emergency_details() {
    let project = Project::new();
    let doc = project.write(
        "errors.yaml",
        r#"
application:
  default_format: xml
  display_errors:
    local: true
    live: false
resolvers:
  - format: html
    content_type: text/html
    class: tests::Echo
exceptions:
  http_status: 500
"#,
    );
    let journal = Journal::default();

    for (env, shown) in [("local", true), ("live", false)] {
        let transport = Arc::new(BufferTransport::new());
        let registry = HandlerRegistry::new();
        let controller = FrontController::builder(
            registry.clone(),
            Arc::clone(&transport) as Arc<dyn Transport>,
        )
        .runtime(RuntimeConfig::new(doc.clone(), env))
        .components(Arc::new(components::registry(&journal, &[], None)))
        .arm();

        registry.dispatch(Fault::new("app::NotFound", "/nope"));
        assert_eq!(controller.state(), PipelineState::Failed);
        let body = transport.last().unwrap().body_str();
        assert_eq!(
            body.contains("default format matches no resolver"),
            shown,
            "environment {env}: {body:?}"
        );
    }
}

#[test]
fn test_started_transport_is_left_alone() {
    let h = harness();
    h.transport.mark_started();
    h.registry.dispatch(Fault::new("app::NotFound", "/nope"));
    assert_eq!(h.transport.count(), 0);
    assert_eq!(h.controller.state(), PipelineState::Armed);
}
