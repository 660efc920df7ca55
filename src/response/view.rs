use serde_json::{Map, Value};

/// Reference to the template that renders a response body, plus the data
/// controllers collect for it
///
/// The file is a path without extension; each resolver appends its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    file: Option<String>,
    data: Map<String, Value>,
}

impl View {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = Some(file.into());
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    /// Set a view variable; the last write for a key wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// View data as a JSON object, the template context resolvers render with.
    #[must_use]
    pub fn context(&self) -> Value {
        Value::Object(self.data.clone())
    }
}
