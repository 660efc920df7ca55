//! # Built-in Components
//!
//! Reporters, view resolvers and a controller that cover the common cases,
//! registered under `faultroute::builtin::*` type names:
//!
//! | Type name                                   | Kind          |
//! |---------------------------------------------|---------------|
//! | `faultroute::builtin::LogReporter`          | reporter      |
//! | `faultroute::builtin::FileReporter`         | reporter      |
//! | `faultroute::builtin::HtmlResolver`         | view resolver |
//! | `faultroute::builtin::JsonResolver`         | view resolver |
//! | `faultroute::builtin::FaultDetailsController` | controller  |
//!
//! [`register`] places each under the base directory the configuration
//! uses for its kind, so the built-ins resolve exactly like host components.

mod controllers;
mod reporters;
mod resolvers;

pub use controllers::FaultDetailsController;
pub use reporters::{FileReporter, LogReporter, DEFAULT_LINE_FORMAT};
pub use resolvers::{HtmlResolver, JsonResolver, HTML_EXTENSION};

use crate::config::Paths;
use crate::locator::ComponentRegistry;

pub const LOG_REPORTER: &str = "faultroute::builtin::LogReporter";
pub const FILE_REPORTER: &str = "faultroute::builtin::FileReporter";
pub const HTML_RESOLVER: &str = "faultroute::builtin::HtmlResolver";
pub const JSON_RESOLVER: &str = "faultroute::builtin::JsonResolver";
pub const FAULT_DETAILS_CONTROLLER: &str = "faultroute::builtin::FaultDetailsController";

/// Register every built-in under the given base directories.
pub fn register(
    registry: &mut ComponentRegistry,
    reporters_dir: &str,
    resolvers_dir: &str,
    controllers_dir: &str,
) {
    registry
        .register_reporter(reporters_dir, LOG_REPORTER, LogReporter::new)
        .register_reporter(reporters_dir, FILE_REPORTER, FileReporter::new)
        .register_view_resolver(resolvers_dir, HTML_RESOLVER, HtmlResolver::new)
        .register_view_resolver(resolvers_dir, JSON_RESOLVER, JsonResolver::new)
        .register_controller(controllers_dir, FAULT_DETAILS_CONTROLLER, FaultDetailsController::new);
}

/// [`register`] using the directories of a configuration's `paths`.
pub fn register_for(registry: &mut ComponentRegistry, paths: &Paths) {
    register(registry, &paths.reporters, &paths.resolvers, &paths.controllers);
}
