use crate::config::Application;
use crate::locator::ViewResolver;
use crate::response::Response;
use anyhow::{anyhow, Context};
use minijinja::{AutoEscape, Environment};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Extension appended to view references by [`HtmlResolver`].
pub const HTML_EXTENSION: &str = "html";

/// Renders `<include_path>/<view>.html` with the view data as context
///
/// A response without a view gets an empty body.
#[derive(Debug)]
pub struct HtmlResolver {
    base_dir: PathBuf,
}

impl HtmlResolver {
    pub fn new(app: &Arc<Application>) -> anyhow::Result<Self> {
        Ok(Self::with_base_dir(app.include_path()))
    }

    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Join `view` onto the base directory, refusing anything that would
    /// leave it.
    fn map_path(&self, view: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(view.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        let mut file = pb.into_os_string();
        file.push(".");
        file.push(HTML_EXTENSION);
        Some(PathBuf::from(file))
    }
}

impl ViewResolver for HtmlResolver {
    fn run(&mut self, response: &mut Response) -> anyhow::Result<()> {
        let Some(view) = response.view().file().map(str::to_string) else {
            response.set_body(Vec::new());
            return Ok(());
        };
        let path = self
            .map_path(&view)
            .ok_or_else(|| anyhow!("view path escapes include path: {}", view))?;
        if !path.is_file() {
            return Err(anyhow!("view file not found: {}", path.display()));
        }
        let source =
            fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))?;
        // Fault messages carry request data; every view is HTML-escaped.
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template("view.html", &source)
            .with_context(|| format!("invalid template {}", path.display()))?;
        let rendered = env
            .get_template("view.html")?
            .render(response.view().context())
            .with_context(|| format!("cannot render {}", path.display()))?;
        debug!(view = %path.display(), bytes = rendered.len(), "view rendered");
        response.set_body(rendered.into_bytes());
        Ok(())
    }
}

/// Serialises the view data as the JSON body
#[derive(Debug, Default)]
pub struct JsonResolver;

impl JsonResolver {
    pub fn new(_app: &Arc<Application>) -> anyhow::Result<Self> {
        Ok(Self)
    }
}

impl ViewResolver for JsonResolver {
    fn run(&mut self, response: &mut Response) -> anyhow::Result<()> {
        let body = serde_json::to_vec(response.view().data())?;
        response.set_body(body);
        Ok(())
    }
}
