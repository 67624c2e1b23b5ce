//! Filter declarations, filter values and page requests.

use std::collections::BTreeMap;

use crate::http::Query;

/// Maps a store-facing filter name to the query parameter the backend
/// expects, e.g. `visibility` to `is_private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterKey {
    pub name: &'static str,
    pub param: &'static str,
    /// Value that selects everything and is therefore never sent.
    pub wildcard: Option<&'static str>,
}

impl FilterKey {
    pub const fn new(name: &'static str, param: &'static str) -> Self {
        Self {
            name,
            param,
            wildcard: None,
        }
    }

    /// Filter whose store name and query parameter coincide.
    pub const fn same(name: &'static str) -> Self {
        Self::new(name, name)
    }

    pub const fn with_wildcard(mut self, wildcard: &'static str) -> Self {
        self.wildcard = Some(wildcard);
        self
    }

    /// Whether `value` narrows the listing.
    pub fn is_active(&self, value: &str) -> bool {
        let value = value.trim();
        !value.is_empty() && Some(value) != self.wildcard
    }
}

/// Filter values keyed by filter name. A missing key reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    values: BTreeMap<String, String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per declared key, all empty.
    pub fn empty_for(keys: &[FilterKey]) -> Self {
        Self {
            values: keys
                .iter()
                .map(|k| (k.name.to_string(), String::new()))
                .collect(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `key=value` pairs as given on the command line.
    pub fn parse_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut filters = Self::new();
        for pair in pairs {
            let (name, value) = pair.split_once('=')?;
            filters.set(name.trim(), value.trim());
        }
        Some(filters)
    }
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// Query for a list call: the page window, then every active filter in
/// declaration order. Filters not declared in `keys` are ignored.
pub fn list_query(page: PageRequest, keys: &[FilterKey], filters: &Filters) -> Query {
    keys.iter().fold(Query::page(page.offset, page.limit), |query, key| {
        let value = filters.get(key.name);
        if key.is_active(value) {
            query.push(key.param, value.trim())
        } else {
            query
        }
    })
}
