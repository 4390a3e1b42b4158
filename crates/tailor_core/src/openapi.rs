//! OpenAPI document structure definitions

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::route::PathItem;
use crate::schema::Components;

/// OpenAPI document version. Only 3.0.0 is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0.0")]
    #[default]
    V3_0_0,
}

/// Contact information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.email.is_none()
    }
}

/// License information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct License {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }
}

/// API information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terms of service URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    /// Contact information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// License information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// API version
    pub version: String,
}

/// Server information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Tag definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One security requirement, e.g. `apiKeyAuth: []`
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// OpenAPI document (root structure)
///
/// Serialized key order: openapi, info, tags, servers, paths, components, security.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApi {
    pub openapi: OpenApiVersion,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Path definitions, sorted by path
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

impl OpenApi {
    /// Empty document for the given title and version
    #[must_use]
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            openapi: OpenApiVersion::default(),
            info: Info {
                title: title.to_string(),
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: version.to_string(),
            },
            tags: None,
            servers: None,
            paths: BTreeMap::new(),
            components: None,
            security: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_yaml() {
        let doc = OpenApi::new("SwaggerGenAPI", "1.0.0");
        let yaml = serde_yaml::to_string(&doc).unwrap();
        assert_eq!(
            yaml,
            "openapi: 3.0.0\ninfo:\n  title: SwaggerGenAPI\n  version: 1.0.0\npaths: {}\n"
        );
    }

    #[test]
    fn info_key_order() {
        let mut doc = OpenApi::new("Petstore", "1.0.0");
        doc.info.description = Some("Pets".to_string());
        doc.info.terms_of_service = Some("http://swagger.io/terms/".to_string());
        doc.info.contact = Some(Contact {
            email: Some("apiteam@swagger.io".to_string()),
            ..Contact::default()
        });
        doc.info.license = Some(License {
            name: Some("Apache 2.0".to_string()),
            url: None,
        });
        let json = serde_json::to_string(&doc.info).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Petstore","description":"Pets","termsOfService":"http://swagger.io/terms/","contact":{"email":"apiteam@swagger.io"},"license":{"name":"Apache 2.0"},"version":"1.0.0"}"#
        );
    }

    #[test]
    fn top_level_key_order() {
        let mut doc = OpenApi::new("t", "1");
        doc.security = Some(vec![IndexMap::from([("basicAuth".to_string(), vec![])])]);
        doc.servers = Some(vec![Server {
            url: "http://localhost".to_string(),
            description: None,
        }]);
        doc.tags = Some(vec![Tag {
            name: "pet".to_string(),
            description: Some("Pets".to_string()),
        }]);
        doc.components = Some(Components::default());
        let json = serde_json::to_string(&doc).unwrap();
        let order: Vec<usize> = ["\"openapi\"", "\"info\"", "\"tags\"", "\"servers\"", "\"paths\"", "\"components\"", "\"security\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn empty_contact_and_license() {
        assert!(Contact::default().is_empty());
        assert!(License::default().is_empty());
        assert!(
            !Contact {
                url: Some("u".to_string()),
                ..Contact::default()
            }
            .is_empty()
        );
    }
}
