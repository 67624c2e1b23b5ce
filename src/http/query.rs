//! Query-string construction for list endpoints.

/// Ordered query parameters. Order is preserved so requests are predictable
/// in logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset pagination: `offset` and `limit` always come first.
    pub fn page(offset: u32, limit: u32) -> Self {
        Self::new()
            .push("offset", offset.to_string())
            .push("limit", limit.to_string())
    }

    /// Cursor pagination: `limit`, `lang` and the opaque cursor when present.
    pub fn cursor(limit: u32, lang: &str, cursor: Option<&str>) -> Self {
        let query = Self::new()
            .push("limit", limit.to_string())
            .push("lang", lang);
        match cursor {
            Some(c) => query.push_non_empty("cursor", c),
            None => query,
        }
    }

    pub fn push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Append only when the value is non-empty after trimming.
    pub fn push_non_empty(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if value.trim().is_empty() {
            self
        } else {
            self.push(key, value.to_string())
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}
