//! Structured form data.
//!
//! An ordered multi-map of string fields, convertible to and from the
//! `application/x-www-form-urlencoded` wire format.

use url::form_urlencoded;

/// Ordered collection of form fields. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Repeated names are kept as separate entries.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`, if any. Field names are case-sensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as `application/x-www-form-urlencoded`.
    pub fn to_urlencoded(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.entries {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// Parse an `application/x-www-form-urlencoded` payload. `+` decodes to a
    /// space, percent escapes are decoded, empty segments are dropped.
    pub fn parse_urlencoded(input: &str) -> Self {
        let mut form = FormData::new();
        for (name, value) in form_urlencoded::parse(input.trim().as_bytes()) {
            form.append(name.into_owned(), value.into_owned());
        }
        form
    }
}
