//! Request-side types: methods, parameters and parsed URLs.

use std::fmt;
use std::str::FromStr;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// TRACE method
    Trace,
    /// CONNECT method
    Connect,
}

impl Method {
    /// Returns the method as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    /// Parses a method name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            _ => Err(format!("unknown method {s:?}")),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request or URL parameters, kept in insertion order.
///
/// Inserting an existing key replaces its value in place, so the order of
/// the first insertion is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates new empty params.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Gets a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the parameter is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Removes a parameter and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Parses a parameter as a specific type.
    #[must_use]
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the parameters as `key=value` pairs joined by `&`.
    ///
    /// Values are percent-encoded; keys are written as is.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parses query parameters from a query string.
    ///
    /// `+` decodes to a space; malformed escapes are kept verbatim.
    #[must_use]
    pub fn parse_query_string(query: &str) -> Self {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), |s| s.into_owned())
}

/// A request URL split into its path and parsed query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    /// Request path.
    pub pathname: String,
    /// Query string parameters.
    pub query: Params,
}

impl Url {
    /// Creates a URL from a path and already parsed query parameters.
    pub fn new(pathname: impl Into<String>, query: Params) -> Self {
        Self {
            pathname: pathname.into(),
            query,
        }
    }

    /// Parses `path?query#fragment`; the fragment is dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
        match raw.split_once('?') {
            Some((path, query)) => Self::new(path, Params::parse_query_string(query)),
            None => Self::new(raw, Params::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("post".parse::<Method>(), Ok(Method::Post));
        assert!("INVALID".parse::<Method>().is_err());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_params_keep_insertion_order() {
        let mut params = Params::new();
        params.insert("b", "1");
        params.insert("a", "2");
        params.insert("b", "3");

        let pairs: Vec<(&str, &str)> = params.iter().collect();
        assert_eq!(pairs, vec![("b", "3"), ("a", "2")]);
        assert_eq!(params.parse::<i64>("b"), Some(3));
        assert_eq!(params.remove("b"), Some("3".to_string()));
        assert!(!params.contains_key("b"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_query_string_encoding() {
        let params: Params = [("q", "rust lang"), ("page", "2")].into_iter().collect();
        assert_eq!(params.to_query_string(), "q=rust%20lang&page=2");
    }

    #[test]
    fn test_query_string_encodes_reserved_marks() {
        let params: Params = [("q", "it's (ok)!*"), ("safe", "a-b_c.d~e")]
            .into_iter()
            .collect();
        assert_eq!(
            params.to_query_string(),
            "q=it%27s%20%28ok%29%21%2A&safe=a-b_c.d~e"
        );
    }

    #[test]
    fn test_query_string_parsing() {
        let query = Params::parse_query_string("name=John+Doe&age=30&city=New%20York&flag");
        assert_eq!(query.get("name"), Some("John Doe"));
        assert_eq!(query.get("age"), Some("30"));
        assert_eq!(query.get("city"), Some("New York"));
        assert_eq!(query.get("flag"), Some(""));
    }

    #[test]
    fn test_url_parse() {
        let url = Url::parse("/search?q=x#top");
        assert_eq!(url.pathname, "/search");
        assert_eq!(url.query.get("q"), Some("x"));

        let url = Url::parse("/blog/my-post");
        assert_eq!(url.pathname, "/blog/my-post");
        assert!(url.query.is_empty());
    }
}
