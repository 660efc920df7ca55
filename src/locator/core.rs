use super::traits::{
    Capability, Controller, ControllerFactory, Reporter, ReporterFactory, ViewResolver,
    ViewResolverFactory,
};
use crate::config::{Application, ConfigNode};
use crate::error::{DispatchError, DispatchResult};
use crate::request::RequestContext;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A constructor registered under a type name
#[derive(Clone)]
pub enum Component {
    Reporter(ReporterFactory),
    Controller(ControllerFactory),
    ViewResolver(ViewResolverFactory),
}

impl Component {
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Component::Reporter(_) => Capability::Reporter,
            Component::Controller(_) => Capability::Controller,
            Component::ViewResolver(_) => Capability::ViewResolver,
        }
    }

    /// The reporter constructor, or a configuration error naming what
    /// `type_name` actually is.
    pub fn into_reporter(self, type_name: &str) -> DispatchResult<ReporterFactory> {
        match self {
            Component::Reporter(f) => Ok(f),
            other => Err(capability_mismatch(type_name, other.capability(), Capability::Reporter)),
        }
    }

    pub fn into_controller(self, type_name: &str) -> DispatchResult<ControllerFactory> {
        match self {
            Component::Controller(f) => Ok(f),
            other => Err(capability_mismatch(type_name, other.capability(), Capability::Controller)),
        }
    }

    pub fn into_view_resolver(self, type_name: &str) -> DispatchResult<ViewResolverFactory> {
        match self {
            Component::ViewResolver(f) => Ok(f),
            other => Err(capability_mismatch(
                type_name,
                other.capability(),
                Capability::ViewResolver,
            )),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.capability())
    }
}

fn capability_mismatch(type_name: &str, found: Capability, expected: Capability) -> DispatchError {
    DispatchError::configuration(format!(
        "'{}' is a {}, expected a {}",
        type_name, found, expected
    ))
}

/// Unqualified name of a type: the segment after the last `::` (or `\`).
#[must_use]
pub fn bare_name(type_name: &str) -> &str {
    let tail = type_name.rsplit("::").next().unwrap_or(type_name);
    tail.rsplit('\\').next().unwrap_or(tail)
}

fn unit_path(base_dir: &str, bare: &str) -> PathBuf {
    Path::new(base_dir)
        .components()
        .filter(|c| !matches!(c, PathComponent::CurDir))
        .collect::<PathBuf>()
        .join(bare)
}

#[derive(Default)]
struct Unit {
    types: HashMap<String, Component>,
}

/// Typed registry resolving configured type names into components
///
/// Components are grouped into units addressed by base directory plus bare
/// type name, the way each configured path is a directory of one unit per
/// type. Units are registered up front; [`locate`](Self::locate) fails fast
/// when the unit or the qualified type inside it is missing.
#[derive(Default)]
pub struct ComponentRegistry {
    units: HashMap<PathBuf, Unit>,
    loaded: Mutex<HashSet<PathBuf>>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` as `type_name` in the unit
    /// `base_dir/<bare name of type_name>`.
    pub fn register(&mut self, base_dir: &str, type_name: &str, component: Component) -> &mut Self {
        let path = unit_path(base_dir, bare_name(type_name));
        self.units
            .entry(path)
            .or_default()
            .types
            .insert(type_name.to_string(), component);
        self
    }

    pub fn register_reporter<R, F>(&mut self, base_dir: &str, type_name: &str, factory: F) -> &mut Self
    where
        R: Reporter + 'static,
        F: Fn(&RequestContext, &ConfigNode) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let factory: ReporterFactory = Arc::new(move |ctx: &RequestContext, node: &ConfigNode| {
            factory(ctx, node).map(|r| Box::new(r) as Box<dyn Reporter>)
        });
        self.register(base_dir, type_name, Component::Reporter(factory))
    }

    pub fn register_controller<C, F>(&mut self, base_dir: &str, type_name: &str, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn(&Arc<Application>, &RequestContext) -> anyhow::Result<C> + Send + Sync + 'static,
    {
        let factory: ControllerFactory =
            Arc::new(move |app: &Arc<Application>, ctx: &RequestContext| {
                factory(app, ctx).map(|c| Box::new(c) as Box<dyn Controller>)
            });
        self.register(base_dir, type_name, Component::Controller(factory))
    }

    pub fn register_view_resolver<V, F>(&mut self, base_dir: &str, type_name: &str, factory: F) -> &mut Self
    where
        V: ViewResolver + 'static,
        F: Fn(&Arc<Application>) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        let factory: ViewResolverFactory = Arc::new(move |app: &Arc<Application>| {
            factory(app).map(|v| Box::new(v) as Box<dyn ViewResolver>)
        });
        self.register(base_dir, type_name, Component::ViewResolver(factory))
    }

    /// Resolve `type_name` (partially or fully qualified) under `base_dir`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ComponentNotFound`] when no unit named after the
    ///   bare type name exists under `base_dir`
    /// - [`DispatchError::TypeNotFound`] when the unit exists but does not
    ///   provide `type_name`
    pub fn locate(&self, base_dir: &str, type_name: &str) -> DispatchResult<Component> {
        let bare = bare_name(type_name);
        if bare.is_empty() {
            return Err(DispatchError::configuration(format!(
                "invalid component type name '{}'",
                type_name
            )));
        }
        let path = unit_path(base_dir, bare);
        let unit = self
            .units
            .get(&path)
            .ok_or_else(|| DispatchError::ComponentNotFound {
                base_dir: base_dir.to_string(),
                name: bare.to_string(),
            })?;
        self.mark_loaded(&path);
        unit.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| DispatchError::TypeNotFound {
                type_name: type_name.to_string(),
            })
    }

    pub fn locate_reporter(&self, base_dir: &str, type_name: &str) -> DispatchResult<ReporterFactory> {
        self.locate(base_dir, type_name)?.into_reporter(type_name)
    }

    pub fn locate_controller(&self, base_dir: &str, type_name: &str) -> DispatchResult<ControllerFactory> {
        self.locate(base_dir, type_name)?.into_controller(type_name)
    }

    pub fn locate_view_resolver(
        &self,
        base_dir: &str,
        type_name: &str,
    ) -> DispatchResult<ViewResolverFactory> {
        self.locate(base_dir, type_name)?.into_view_resolver(type_name)
    }

    fn mark_loaded(&self, path: &Path) {
        if let Ok(mut loaded) = self.loaded.lock() {
            if loaded.insert(path.to_path_buf()) {
                debug!(unit = %path.display(), "component unit loaded");
            }
        }
    }

    /// Whether a unit has been located at least once.
    #[must_use]
    pub fn is_loaded(&self, base_dir: &str, bare: &str) -> bool {
        let path = unit_path(base_dir, bare);
        self.loaded.lock().map(|l| l.contains(&path)).unwrap_or(false)
    }

    /// Number of registered units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
