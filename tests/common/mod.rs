#![allow(dead_code)]

pub mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A throwaway project directory holding a routing document plus the
    /// view and log files it points at.
    pub struct Project {
        dir: TempDir,
    }

    impl Project {
        pub fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        /// Write `content` to `rel`, creating parent directories.
        pub fn write(&self, rel: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
            path
        }

        pub fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.dir.path().join(rel)).unwrap()
        }

        pub fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }
    }

    /// Document routing to test components under `tests::*` type names.
    pub const DOCUMENT: &str = r#"
application:
  version: "1.0.0"
  default_format: html
  display_errors:
    local: true
    live: false
  paths:
    views: views
reporters:
  local:
    - class: tests::Recording
      tag: first
    - class: tests::Recording
      tag: second
resolvers:
  - format: html
    content_type: text/html
    charset: UTF-8
    class: tests::Echo
  - format: json
    content_type: application/json
    class: tests::Echo
exceptions:
  view: "500"
  routes:
    - class: app::NotFound
      http_status: 404
      error_type: CLIENT
      view: "404"
    - class: app::Teapot
      controller: tests::Teapot
      http_status: 418
    - class: app::Moved
      controller: tests::Redirect
    - class: app::Api
      format: json
      http_status: 400
    - class: app::Misrouted
      controller: tests::Echo
    - class: app::Exploding
      controller: tests::Panicking
"#;
}

pub mod components {
    use faultroute::config::{Application, ConfigNode};
    use faultroute::fault::Fault;
    use faultroute::handler::HandlerRegistry;
    use faultroute::locator::{ComponentRegistry, Controller, Reporter, ViewResolver};
    use faultroute::request::RequestContext;
    use faultroute::response::Response;
    use std::sync::{Arc, Mutex};

    pub const DIR_REPORTERS: &str = "reporters";
    pub const DIR_CONTROLLERS: &str = "controllers";
    pub const DIR_RESOLVERS: &str = "resolvers";

    /// One line per reporter run: `<tag>:<fault type>`, plus what the
    /// handler slot held while it ran.
    #[derive(Clone, Default)]
    pub struct Journal {
        pub entries: Arc<Mutex<Vec<String>>>,
    }

    impl Journal {
        pub fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    pub struct Recording {
        tag: String,
        fault: Fault,
        journal: Journal,
        fail: bool,
    }

    impl Reporter for Recording {
        fn run(&mut self) -> anyhow::Result<()> {
            self.journal
                .push(format!("{}:{}", self.tag, self.fault.type_name()));
            if self.fail {
                anyhow::bail!("{} reporter storage unavailable", self.tag);
            }
            Ok(())
        }
    }

    pub struct Teapot;

    impl Controller for Teapot {
        fn run(&mut self, response: &mut Response) -> anyhow::Result<()> {
            response.set_header("X-Teapot", "short and stout");
            response.set_body("I'm a teapot");
            Ok(())
        }
    }

    pub struct Redirect;

    impl Controller for Redirect {
        fn run(&mut self, response: &mut Response) -> anyhow::Result<()> {
            response.redirect("/moved-here", true, true);
            Ok(())
        }
    }

    pub struct Panicking;

    impl Controller for Panicking {
        fn run(&mut self, _response: &mut Response) -> anyhow::Result<()> {
            panic!("controller blew up");
        }
    }

    /// Resolver writing `view=<file>` as the body.
    pub struct Echo;

    impl ViewResolver for Echo {
        fn run(&mut self, response: &mut Response) -> anyhow::Result<()> {
            let body = format!("view={}", response.view().file().unwrap_or("-"));
            response.set_body(body);
            Ok(())
        }
    }

    /// Registry with the test components. Reporters tagged in `failing`
    /// return an error; the journal also records whether `handlers` held the
    /// emergency handler while each reporter was built.
    pub fn registry(
        journal: &Journal,
        failing: &[&str],
        handlers: Option<(HandlerRegistry, Arc<dyn faultroute::handler::ErrorHandler>)>,
    ) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        let journal = journal.clone();
        let failing: Vec<String> = failing.iter().map(|s| s.to_string()).collect();
        registry
            .register_reporter(
                DIR_REPORTERS,
                "tests::Recording",
                move |ctx: &RequestContext, cfg: &ConfigNode| {
                    let tag = cfg.attr("tag").unwrap_or_default();
                    if let Some((slot, emergency)) = &handlers {
                        journal.push(format!("emergency-installed:{}", slot.is_current(emergency)));
                    }
                    Ok(Recording {
                        fail: failing.contains(&tag),
                        tag,
                        fault: ctx.fault().clone(),
                        journal: journal.clone(),
                    })
                },
            )
            .register_controller(DIR_CONTROLLERS, "tests::Teapot", |_app: &Arc<Application>, _ctx: &RequestContext| Ok(Teapot))
            .register_controller(DIR_CONTROLLERS, "tests::Redirect", |_app: &Arc<Application>, _ctx: &RequestContext| Ok(Redirect))
            .register_controller(DIR_CONTROLLERS, "tests::Panicking", |_app: &Arc<Application>, _ctx: &RequestContext| Ok(Panicking))
            .register_view_resolver(DIR_RESOLVERS, "tests::Echo", |_app: &Arc<Application>| Ok(Echo))
            // a resolver sitting where controllers are looked up
            .register_view_resolver(DIR_CONTROLLERS, "tests::Echo", |_app: &Arc<Application>| Ok(Echo));
        registry
    }
}
