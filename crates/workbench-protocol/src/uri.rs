//! URI components in the shape the workbench revives on the client side.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// RFC 3986 appendix B splitter.
static URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([^:/?#]+?):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?").expect("valid uri regex")
});

static SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w[\w\d+.-]*$").expect("valid scheme regex"));

/// Scheme assumed for URIs written without one.
const DEFAULT_SCHEME: &str = "file";

/// Errors raised when a URI string cannot be turned into components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
    #[error("invalid URI scheme: {0:?}")]
    InvalidScheme(String),
    #[error("URI with an authority must have an absolute path, got {0:?}")]
    RelativePathWithAuthority(String),
    #[error("URI without an authority cannot have a path starting with '//', got {0:?}")]
    DoubleSlashPath(String),
}

/// The components of a URI. Empty components are omitted on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UriComponents {
    pub scheme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl UriComponents {
    /// Build components from individually supplied parts.
    ///
    /// Empty strings count as absent. A path given alongside an authority is
    /// made absolute.
    pub fn from_parts(
        scheme: impl Into<String>,
        authority: Option<&str>,
        path: Option<&str>,
        query: Option<&str>,
        fragment: Option<&str>,
    ) -> Self {
        let authority = non_empty(authority);
        let mut path = non_empty(path);
        if authority.is_some() {
            if let Some(p) = path.as_mut() {
                if !p.starts_with('/') {
                    p.insert(0, '/');
                }
            }
        }
        Self {
            scheme: scheme.into(),
            authority,
            path,
            query: non_empty(query),
            fragment: non_empty(fragment),
        }
    }

    /// Address on `scheme://authority` at `path`.
    pub fn address(scheme: &str, authority: &str, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.to_string(),
            authority: Some(authority.to_string()),
            path: Some(path.into()),
            query: None,
            fragment: None,
        }
    }

    /// Parse a URI string such as `vscode-test-web://mount/` or
    /// `file:///home/user/project`.
    pub fn parse(value: &str) -> Result<Self, UriError> {
        let Some(caps) = URI_REGEX.captures(value) else {
            return Err(UriError::InvalidScheme(value.to_string()));
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str());

        let scheme = group(2).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SCHEME);
        if !SCHEME_REGEX.is_match(scheme) {
            return Err(UriError::InvalidScheme(scheme.to_string()));
        }

        let authority = group(4).filter(|a| !a.is_empty());
        let path = group(5).unwrap_or_default();
        if authority.is_some() && !path.is_empty() && !path.starts_with('/') {
            return Err(UriError::RelativePathWithAuthority(value.to_string()));
        }
        if authority.is_none() && path.starts_with("//") {
            return Err(UriError::DoubleSlashPath(value.to_string()));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            authority: authority.map(percent_decode),
            path: non_empty(Some(path)).map(|p| percent_decode(&p)),
            query: non_empty(group(7)).map(|q| percent_decode(&q)),
            fragment: non_empty(group(9)).map(|f| percent_decode(&f)),
        })
    }
}

impl fmt::Display for UriComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(authority) = &self.authority {
            write!(f, "//{authority}")?;
        }
        if let Some(path) = &self.path {
            f.write_str(path)?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Decode `%XX` escapes. A component that does not decode to UTF-8 is kept
/// as written.
fn percent_decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| component.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
