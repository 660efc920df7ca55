use serde_yaml::Value;

/// Read-only view over one node of a loaded configuration document
///
/// Mappings are nested sections, sequences are ordered repeatable groups and
/// scalars are attribute-like string fields. Numbers and booleans are read
/// through their string form, and an empty string counts as "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigNode(Value);

impl ConfigNode {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// A node that declares nothing.
    #[must_use]
    pub fn null() -> Self {
        Self(Value::Null)
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Nested section by name; `None` if absent or if this node is not a mapping.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<ConfigNode> {
        self.0
            .get(name)
            .filter(|v| !v.is_null())
            .map(|v| ConfigNode(v.clone()))
    }

    /// Attribute value by name, rendered as a string.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(scalar_to_string)
    }

    /// This node's own scalar value.
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        scalar_to_string(&self.0)
    }

    /// Ordered entries of a repeatable group.
    ///
    /// A sequence yields its items, a lone mapping yields itself so a group
    /// with one member may be written without the list syntax, and anything
    /// else yields nothing.
    #[must_use]
    pub fn entries(&self) -> Vec<ConfigNode> {
        match &self.0 {
            Value::Sequence(items) => items.iter().cloned().map(ConfigNode).collect(),
            Value::Mapping(_) => vec![self.clone()],
            _ => Vec::new(),
        }
    }

    /// Keys of a mapping node in declaration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match &self.0 {
            Value::Mapping(map) => map.keys().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether this node is truthy: a non-empty scalar other than
    /// `false`, `0` or `off`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match &self.0 {
            Value::Bool(b) => *b,
            other => scalar_to_string(other)
                .map(|s| !matches!(s.to_ascii_lowercase().as_str(), "false" | "0" | "off" | "no"))
                .unwrap_or(false),
        }
    }
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(yaml: &str) -> ConfigNode {
        ConfigNode::new(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_attr_renders_scalars() {
        let n = node("status: 404\nname: html\nflag: true\nempty: ''");
        assert_eq!(n.attr("status").as_deref(), Some("404"));
        assert_eq!(n.attr("name").as_deref(), Some("html"));
        assert_eq!(n.attr("flag").as_deref(), Some("true"));
        assert_eq!(n.attr("empty"), None);
        assert_eq!(n.attr("missing"), None);
    }

    #[test]
    fn test_entries_accepts_single_mapping() {
        let list = node("routes:\n  - class: A\n  - class: B");
        let names: Vec<_> = list
            .child("routes")
            .unwrap()
            .entries()
            .iter()
            .filter_map(|e| e.attr("class"))
            .collect();
        assert_eq!(names, vec!["A", "B"]);

        let single = node("routes:\n  class: A");
        assert_eq!(single.child("routes").unwrap().entries().len(), 1);
    }

    #[test]
    fn test_keys_keep_declaration_order() {
        let n = node("zeta: 1\nalpha: 2\nmid: 3");
        assert_eq!(n.keys(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_truthiness() {
        let n = node("a: true\nb: 'off'\nc: 1\nd: 0");
        assert!(n.child("a").unwrap().is_truthy());
        assert!(!n.child("b").unwrap().is_truthy());
        assert!(n.child("c").unwrap().is_truthy());
        assert!(!n.child("d").unwrap().is_truthy());
        assert!(!ConfigNode::null().is_truthy());
    }
}
