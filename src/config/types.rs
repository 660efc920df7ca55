use super::node::ConfigNode;
use crate::error::{DispatchError, DispatchResult};
use http::StatusCode;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Classification of a routed fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorType {
    /// Not an error, e.g. a fault used for flow control
    None,
    /// An operation on the server side failed
    Server,
    /// The client is at fault (e.g. asked for a missing resource)
    Client,
    /// A syntax error surfaced at runtime
    Syntax,
    /// A logical error in application code
    Logical,
}

impl FromStr for ErrorType {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(ErrorType::None),
            "SERVER" => Ok(ErrorType::Server),
            "CLIENT" => Ok(ErrorType::Client),
            "SYNTAX" => Ok(ErrorType::Syntax),
            "LOGICAL" => Ok(ErrorType::Logical),
            _ => Err(DispatchError::configuration(format!(
                "invalid error type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::None => "NONE",
            ErrorType::Server => "SERVER",
            ErrorType::Client => "CLIENT",
            ErrorType::Syntax => "SYNTAX",
            ErrorType::Logical => "LOGICAL",
        };
        write!(f, "{}", s)
    }
}

/// Handling policy for one fault type, or for the default case
///
/// `format` names an entry of the [`FormatTable`]; it is the route's
/// response content type in the sense of "which representation", not a
/// MIME string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub controller: Option<String>,
    pub view: Option<String>,
    pub http_status: Option<StatusCode>,
    pub error_type: Option<ErrorType>,
    pub format: Option<String>,
}

impl Route {
    /// Read a route from an exception block or one of its route entries.
    pub fn from_node(node: &ConfigNode) -> DispatchResult<Self> {
        let http_status = node
            .attr("http_status")
            .map(|s| parse_status(&s))
            .transpose()?;
        let error_type = node
            .attr("error_type")
            .map(|s| s.parse::<ErrorType>())
            .transpose()?;
        Ok(Self {
            controller: node.attr("controller"),
            view: node.attr("view"),
            http_status,
            error_type,
            format: node.attr("format").or_else(|| node.attr("content_type")),
        })
    }

    /// Status after defaulting; unset means 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.http_status
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Parse a configured status: an integer, or a string led by one
/// (`"404"`, `"404 Not Found"`).
pub fn parse_status(raw: &str) -> DispatchResult<StatusCode> {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| DispatchError::configuration(format!("invalid http status: {}", raw)))
}

/// Ordered mapping from fault type name to [`Route`]
///
/// The empty-string key holds the default route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<(String, Route)>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    /// Key of the default route.
    pub const DEFAULT_KEY: &'static str = "";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a route; a replaced key keeps its original position.
    pub fn insert(&mut self, type_name: impl Into<String>, route: Route) {
        let type_name = type_name.into();
        match self.index.get(&type_name) {
            Some(&pos) => self.entries[pos].1 = route,
            None => {
                self.index.insert(type_name.clone(), self.entries.len());
                self.entries.push((type_name, route));
            }
        }
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Route> {
        self.index.get(type_name).map(|&pos| &self.entries[pos].1)
    }

    #[must_use]
    pub fn default_route(&self) -> Option<&Route> {
        self.get(Self::DEFAULT_KEY)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }
}

impl<K: Into<String>> FromIterator<(K, Route)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (K, Route)>>(iter: I) -> Self {
        let mut table = RouteTable::new();
        for (k, r) in iter {
            table.insert(k, r);
        }
        table
    }
}

/// Named response representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub name: String,
    pub content_type: String,
    pub charset: Option<String>,
    pub resolver: String,
}

impl Format {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        resolver: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            charset: None,
            resolver: resolver.into(),
        }
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Read a format from one `resolvers` entry.
    pub fn from_node(node: &ConfigNode) -> DispatchResult<Self> {
        let name = node
            .attr("format")
            .or_else(|| node.attr("name"))
            .ok_or_else(|| DispatchError::configuration("format entry missing 'format' name"))?;
        let content_type = node.attr("content_type").ok_or_else(|| {
            DispatchError::configuration(format!("format '{}' missing content_type", name))
        })?;
        let resolver = node.attr("class").ok_or_else(|| {
            DispatchError::configuration(format!("format '{}' missing resolver class", name))
        })?;
        Ok(Self {
            name,
            content_type,
            charset: node.attr("charset"),
            resolver,
        })
    }

    /// Value for the `Content-Type` header, charset included when declared.
    #[must_use]
    pub fn content_type_header(&self) -> String {
        match &self.charset {
            Some(charset) => format!("{}; charset={}", self.content_type, charset),
            None => self.content_type.clone(),
        }
    }
}

/// Formats keyed by name, in declaration order
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    formats: Vec<Format>,
}

impl FormatTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name.
    pub fn insert(&mut self, format: Format) {
        match self.formats.iter_mut().find(|f| f.name == format.name) {
            Some(existing) => *existing = format,
            None => self.formats.push(format),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Format> {
        self.formats.iter()
    }
}

impl FromIterator<Format> for FormatTable {
    fn from_iter<I: IntoIterator<Item = Format>>(iter: I) -> Self {
        let mut table = FormatTable::new();
        for f in iter {
            table.insert(f);
        }
        table
    }
}

/// A reporter declared for the active environment
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterDescriptor {
    pub type_name: String,
    /// The whole declaring entry, handed to the reporter verbatim
    pub config: ConfigNode,
}

impl ReporterDescriptor {
    pub fn from_node(node: ConfigNode) -> DispatchResult<Self> {
        let type_name = node
            .attr("class")
            .ok_or_else(|| DispatchError::configuration("reporter entry missing 'class'"))?;
        Ok(Self {
            type_name,
            config: node,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(yaml: &str) -> ConfigNode {
        ConfigNode::new(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_parse_status_forms() {
        assert_eq!(parse_status("404").unwrap(), StatusCode::NOT_FOUND);
        assert_eq!(parse_status("404 Not Found").unwrap(), StatusCode::NOT_FOUND);
        assert!(parse_status("abc").is_err());
        assert!(parse_status("99").is_err());
    }

    #[test]
    fn test_route_from_node() {
        let route = Route::from_node(&node(
            "controller: NotFound\nview: '404'\nhttp_status: 404\nerror_type: client\ncontent_type: json",
        ))
        .unwrap();
        assert_eq!(route.controller.as_deref(), Some("NotFound"));
        assert_eq!(route.view.as_deref(), Some("404"));
        assert_eq!(route.http_status, Some(StatusCode::NOT_FOUND));
        assert_eq!(route.error_type, Some(ErrorType::Client));
        assert_eq!(route.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_route_rejects_unknown_error_type() {
        let err = Route::from_node(&node("error_type: FATAL")).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("invalid error type"));
    }

    #[test]
    fn test_route_table_replaces_in_place() {
        let mut table = RouteTable::new();
        table.insert("", Route::default());
        table.insert("a::B", Route::default());
        table.insert(
            "",
            Route {
                view: Some("500".into()),
                ..Route::default()
            },
        );
        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["", "a::B"]);
        assert_eq!(table.default_route().unwrap().view.as_deref(), Some("500"));
    }

    #[test]
    fn test_format_requires_content_type_and_class() {
        let missing_ct = Format::from_node(&node("format: html\nclass: Html")).unwrap_err();
        assert!(missing_ct.to_string().contains("content_type"));
        let missing_class =
            Format::from_node(&node("format: html\ncontent_type: text/html")).unwrap_err();
        assert!(missing_class.to_string().contains("resolver class"));
    }

    #[test]
    fn test_format_content_type_header() {
        let f = Format::new("html", "text/html", "Html").with_charset("UTF-8");
        assert_eq!(f.content_type_header(), "text/html; charset=UTF-8");
        assert_eq!(Format::new("json", "application/json", "Json").content_type_header(), "application/json");
    }
}
