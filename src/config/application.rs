use super::load::{load_document, parse_document, SectionResolver};
use super::node::ConfigNode;
use super::types::{Format, FormatTable, ReporterDescriptor, Route, RouteTable};
use crate::error::{DispatchError, DispatchResult};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Section holding application metadata, paths and display flags.
pub const APPLICATION_SECTION: &str = "application";
/// Section holding per-environment reporter lists.
pub const REPORTERS_SECTION: &str = "reporters";
/// Section holding one entry per response format.
pub const RESOLVERS_SECTION: &str = "resolvers";
/// Section holding the default route and per-fault-type routes.
pub const EXCEPTIONS_SECTION: &str = "exceptions";

/// Base directories components and views are looked up under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub controllers: String,
    pub reporters: String,
    pub views: String,
    pub resolvers: String,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            controllers: "controllers".to_string(),
            reporters: "reporters".to_string(),
            views: "views".to_string(),
            resolvers: "resolvers".to_string(),
        }
    }
}

/// Typed, read-only view over a loaded configuration document for one
/// environment
///
/// Scalar settings and the active environment's reporter list are read at
/// load time. The route and format tables are built on first access and
/// memoized; sections declared as `ref` are loaded lazily through the
/// embedded [`SectionResolver`].
#[derive(Debug)]
pub struct Application {
    environment: String,
    include_path: PathBuf,
    version: String,
    default_format: String,
    display_errors: bool,
    paths: Paths,
    reporters: Vec<ReporterDescriptor>,
    sections: SectionResolver,
    routes: OnceCell<RouteTable>,
    formats: OnceCell<FormatTable>,
}

impl Application {
    /// Load the document at `path` for `environment`.
    ///
    /// `ref` sections and, until [`Application::with_include_path`] says
    /// otherwise, view files resolve against the document's directory.
    pub fn load(path: impl AsRef<Path>, environment: &str) -> DispatchResult<Self> {
        let path = path.as_ref();
        let root = load_document(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        info!(document = %path.display(), environment, "loading error routing configuration");
        Self::from_node(root, environment, base_dir)
    }

    /// Build from YAML text; `base_dir` anchors `ref` paths.
    pub fn parse(
        content: &str,
        environment: &str,
        base_dir: impl Into<PathBuf>,
    ) -> DispatchResult<Self> {
        let root = parse_document(content, false).map_err(|message| DispatchError::Document {
            path: "<inline>".to_string(),
            message,
        })?;
        Self::from_node(root, environment, base_dir)
    }

    /// Build from an already parsed configuration tree.
    pub fn from_node(
        root: ConfigNode,
        environment: &str,
        base_dir: impl Into<PathBuf>,
    ) -> DispatchResult<Self> {
        let base_dir = base_dir.into();
        let sections = SectionResolver::new(root, base_dir.clone());

        let application = sections.resolve(APPLICATION_SECTION)?;
        let default_format = application.attr("default_format").ok_or_else(|| {
            DispatchError::configuration("application.default_format is not set")
        })?;
        let display_errors = application
            .child("display_errors")
            .and_then(|d| d.child(environment))
            .is_some_and(|flag| flag.is_truthy());
        let paths = read_paths(application.child("paths").unwrap_or_default());

        let reporters = read_reporters(&sections.resolve(REPORTERS_SECTION)?, environment)?;
        debug!(
            environment,
            reporters = reporters.len(),
            default_format = %default_format,
            "configuration loaded"
        );

        Ok(Self {
            environment: environment.to_string(),
            include_path: base_dir,
            version: application.attr("version").unwrap_or_default(),
            default_format,
            display_errors,
            paths,
            reporters,
            sections,
            routes: OnceCell::new(),
            formats: OnceCell::new(),
        })
    }

    /// Root directory the HTML resolver reads view files from.
    #[must_use]
    pub fn with_include_path(mut self, include_path: impl Into<PathBuf>) -> Self {
        self.include_path = include_path.into();
        self
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    #[must_use]
    pub fn include_path(&self) -> &Path {
        &self.include_path
    }

    /// `path` resolved against the include path.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        self.include_path.join(path)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Format name used when neither the caller nor the route picks one.
    #[must_use]
    pub fn default_format(&self) -> &str {
        &self.default_format
    }

    /// Whether internal details may be shown for the active environment.
    #[must_use]
    pub fn display_errors(&self) -> bool {
        self.display_errors
    }

    #[must_use]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    #[must_use]
    pub fn controllers_path(&self) -> &str {
        &self.paths.controllers
    }

    #[must_use]
    pub fn reporters_path(&self) -> &str {
        &self.paths.reporters
    }

    #[must_use]
    pub fn views_path(&self) -> &str {
        &self.paths.views
    }

    #[must_use]
    pub fn resolvers_path(&self) -> &str {
        &self.paths.resolvers
    }

    /// Reporters declared for the active environment, in declaration order.
    #[must_use]
    pub fn reporters(&self) -> &[ReporterDescriptor] {
        &self.reporters
    }

    /// Top-level section by name, following a `ref` if declared.
    pub fn resolve_section(&self, name: &str) -> DispatchResult<ConfigNode> {
        self.sections.resolve(name)
    }

    /// Number of `ref` sections loaded so far.
    #[must_use]
    pub fn referenced_sections(&self) -> usize {
        self.sections.cached_sections()
    }

    /// Route table: the exception block as default plus one route per entry.
    pub fn routes(&self) -> DispatchResult<&RouteTable> {
        self.routes
            .get_or_try_init(|| build_routes(&self.sections.resolve(EXCEPTIONS_SECTION)?))
    }

    /// Format table keyed by format name.
    pub fn formats(&self) -> DispatchResult<&FormatTable> {
        self.formats
            .get_or_try_init(|| build_formats(&self.sections.resolve(RESOLVERS_SECTION)?))
    }
}

fn read_paths(node: ConfigNode) -> Paths {
    let defaults = Paths::default();
    Paths {
        controllers: node.attr("controllers").unwrap_or(defaults.controllers),
        reporters: node.attr("reporters").unwrap_or(defaults.reporters),
        views: node.attr("views").unwrap_or(defaults.views),
        resolvers: node.attr("resolvers").unwrap_or(defaults.resolvers),
    }
}

fn read_reporters(section: &ConfigNode, environment: &str) -> DispatchResult<Vec<ReporterDescriptor>> {
    let Some(branch) = section.child(environment) else {
        return Ok(Vec::new());
    };
    branch
        .entries()
        .into_iter()
        .map(ReporterDescriptor::from_node)
        .collect()
}

/// Build a route table from the `exceptions` section.
pub fn build_routes(section: &ConfigNode) -> DispatchResult<RouteTable> {
    let mut table = RouteTable::new();
    if section.is_null() {
        return Ok(table);
    }
    table.insert(RouteTable::DEFAULT_KEY, Route::from_node(section)?);
    if let Some(entries) = section.child("routes") {
        for entry in entries.entries() {
            let type_name = entry.attr("class").ok_or_else(|| {
                DispatchError::configuration("exception route missing 'class'")
            })?;
            table.insert(type_name, Route::from_node(&entry)?);
        }
    }
    Ok(table)
}

/// Build a format table from the `resolvers` section.
pub fn build_formats(section: &ConfigNode) -> DispatchResult<FormatTable> {
    section.entries().iter().map(Format::from_node).collect()
}
