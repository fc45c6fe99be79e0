//! Parameters extracted by a match.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Named values captured from the request host, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParams(Vec<(String, String)>);

impl DomainParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DomainParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Everything an action receives from the router.
///
/// Domain parameters come first, then positional path parameters, which
/// is also the order [`RouteParams::values`] yields them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteParams {
    domain: DomainParams,
    path: Vec<String>,
    #[serde(skip)]
    path_names: Vec<String>,
}

impl RouteParams {
    pub fn new(domain: DomainParams, path: Vec<String>, path_names: Vec<String>) -> Self {
        Self {
            domain,
            path,
            path_names,
        }
    }

    pub fn from_domain(domain: DomainParams) -> Self {
        Self {
            domain,
            ..Self::default()
        }
    }

    pub fn domain(&self) -> &DomainParams {
        &self.domain
    }

    /// Positional path values.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Look a value up by placeholder name, domain first.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.domain.get(name).or_else(|| {
            self.path_names
                .iter()
                .position(|n| n == name)
                .and_then(|i| self.path.get(i))
                .map(String::as_str)
        })
    }

    /// All values in invocation order: domain, then path.
    pub fn values(&self) -> Vec<&str> {
        self.domain
            .iter()
            .map(|(_, v)| v)
            .chain(self.path.iter().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty() && self.path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_put_domain_first() {
        let mut domain = DomainParams::new();
        domain.push("tenant", "acme");
        let params = RouteParams::new(domain, vec!["42".into()], vec!["id".into()]);

        assert_eq!(params.values(), vec!["acme", "42"]);
        assert_eq!(params.get("tenant"), Some("acme"));
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_serializes_domain_as_map() {
        let mut domain = DomainParams::new();
        domain.push("subdomain", "shop");
        let params = RouteParams::new(domain, vec!["1".into()], vec!["id".into()]);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "domain": { "subdomain": "shop" }, "path": ["1"] })
        );
    }
}
