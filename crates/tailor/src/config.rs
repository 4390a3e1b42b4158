//! Document settings with environment variable fallbacks.
//!
//! | field | variable |
//! |---|---|
//! | title | `TAILOR_TITLE` |
//! | description | `TAILOR_DESCRIPTION` |
//! | version | `TAILOR_VERSION`, then `CARGO_PKG_VERSION` |
//! | server URL | `TAILOR_SERVER_URL` (http and https only) |
//! | server description | `TAILOR_SERVER_DESCRIPTION` |
//! | default content type | `TAILOR_CONTENT_TYPE` |
//! | output file | `TAILOR_OPENAPI` |

use std::path::Path;

/// Settings for [`Document::from_config`](crate::Document::from_config).
///
/// Explicit values always win over fallbacks.
///
/// ```
/// use tailor::config::DocumentConfig;
///
/// let config = DocumentConfig::default()
///     .with_title("Pets")
///     .with_fallbacks_from(|key| (key == "TAILOR_VERSION").then(|| "2.1.0".to_string()));
/// assert_eq!(config.title.as_deref(), Some("Pets"));
/// assert_eq!(config.version.as_deref(), Some("2.1.0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub server_url: Option<String>,
    pub server_description: Option<String>,
    pub content_type: Option<String>,
    /// Where the generated document should be written
    pub output: Option<String>,
}

impl DocumentConfig {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_server(mut self, url: impl Into<String>, description: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self.server_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Fill unset fields from the process environment.
    #[must_use]
    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks_from(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from `lookup`, which maps a variable name to its value.
    #[must_use]
    pub fn with_fallbacks_from(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let server_url = self.server_url.clone().or_else(|| {
            lookup("TAILOR_SERVER_URL").filter(|url| {
                let accepted = url.starts_with("http://") || url.starts_with("https://");
                if !accepted {
                    tracing::warn!(url = %url, "ignoring TAILOR_SERVER_URL without an http(s) scheme");
                }
                accepted
            })
        });
        let server_description = match (&self.server_description, &server_url) {
            (Some(description), _) => Some(description.clone()),
            (None, Some(_)) => lookup("TAILOR_SERVER_DESCRIPTION"),
            (None, None) => None,
        };

        Self {
            title: self.title.or_else(|| lookup("TAILOR_TITLE")),
            description: self.description.or_else(|| lookup("TAILOR_DESCRIPTION")),
            version: self
                .version
                .or_else(|| lookup("TAILOR_VERSION"))
                .or_else(|| lookup("CARGO_PKG_VERSION")),
            server_url,
            server_description,
            content_type: self.content_type.or_else(|| lookup("TAILOR_CONTENT_TYPE")),
            output: self.output.or_else(|| lookup("TAILOR_OPENAPI")),
        }
    }

    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref().map(Path::new)
    }
}
