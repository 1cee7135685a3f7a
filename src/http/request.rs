use std::borrow::Cow;

/// A request line reduced to the two parts the handler cares about.
///
/// For `GET /toggle?state=1 HTTP/1.1` the path is `/toggle` and the params
/// are `state=1`. The method token and everything after the request target
/// are dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    path: String,
    params: String,
}

impl ParsedRequest {
    pub fn new(path: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: params.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw parameter string, without the leading `?`. Empty when the request
    /// target had no parameter marker.
    pub fn params(&self) -> &str {
        &self.params
    }

    /// Decodes the parameter string as `application/x-www-form-urlencoded`
    /// pairs.
    pub fn query_pairs(&self) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
        url::form_urlencoded::parse(self.params.as_bytes())
    }

    /// Returns the first decoded value for `key`.
    pub fn param(&self, key: &str) -> Option<String> {
        query_param(&self.params, key)
    }
}

/// Looks up the first decoded value for `key` in a raw parameter string.
///
/// Handlers receive the raw string, so this is exposed on its own as well.
pub fn query_param(params: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(params.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
