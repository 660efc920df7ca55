use crate::config::Application;
use crate::locator::Controller;
use crate::request::RequestContext;
use crate::response::Response;
use serde_json::Value;
use std::sync::Arc;

/// Fills the view with what a generic error page needs
///
/// `status`, `fault_id` and `error_type` are always set. The fault's type,
/// message and location are added only when the active environment
/// displays errors.
#[derive(Debug)]
pub struct FaultDetailsController {
    display_errors: bool,
    ctx: RequestContext,
}

impl FaultDetailsController {
    pub fn new(app: &Arc<Application>, ctx: &RequestContext) -> anyhow::Result<Self> {
        Ok(Self {
            display_errors: app.display_errors(),
            ctx: ctx.clone(),
        })
    }
}

impl Controller for FaultDetailsController {
    fn run(&mut self, response: &mut Response) -> anyhow::Result<()> {
        let fault = self.ctx.fault();
        let status = response.status().as_u16();
        let error_type = self
            .ctx
            .route()
            .error_type
            .map(|t| t.to_string())
            .unwrap_or_default();
        let view = response.view_mut();
        view.insert("status", status);
        view.insert("fault_id", fault.id().to_string());
        view.insert("error_type", error_type);
        if self.display_errors {
            view.insert("type", fault.type_name());
            view.insert("message", fault.message());
            let location = match fault.location() {
                Some(location) => serde_json::to_value(location)?,
                None => Value::Null,
            };
            view.insert("location", location);
        }
        Ok(())
    }
}
