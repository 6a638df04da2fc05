use std::collections::BTreeMap;
use std::fmt;

/// Parameter names whose values are credentials and never logged.
const SECRET_KEYS: &[&str] = &["apikey", "api_key", "token"];

/// Query parameters for a single vendor request.
///
/// Keys are kept sorted so two parameter sets built from the same inputs
/// compare and log identically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pairs suitable for `reqwest::RequestBuilder::query`.
    pub fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }

    /// Render as `k=v&...` with credential values masked.
    pub fn redacted(&self) -> String {
        self.iter()
            .map(|(k, v)| {
                if SECRET_KEYS.contains(&k) {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// A fully built GET request: target URL plus query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub params: QueryParams,
}

impl ApiRequest {
    pub fn new(url: impl Into<String>, params: QueryParams) -> Self {
        Self {
            url: url.into(),
            params,
        }
    }

    /// A request without query parameters.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, QueryParams::new())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{}?{}", self.url, self.params.redacted())
        }
    }
}
