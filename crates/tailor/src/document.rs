//! The document registry and its YAML emitter.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use tailor_core::openapi::{Contact, License, OpenApi, SecurityRequirement, Server, Tag};
use tailor_core::route::{
    self, MediaType, Parameter, ParameterLocation, PathItem, RequestBody,
};
use tailor_core::schema::{Components, Schema, SecurityScheme};

use crate::collector::collect_components;
use crate::config::DocumentConfig;
use crate::descriptor::{Describe, Kind, TypeDescriptor};
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::render::{Renderer, expand_always, expand_local, prefer_refs};
use crate::rules::{Rule, RuleRegistry};
use crate::walker;

const DEFAULT_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain";

const PARAMETER_LOCATIONS: [ParameterLocation; 3] = [
    ParameterLocation::Path,
    ParameterLocation::Query,
    ParameterLocation::Header,
];

/// Collects endpoints and document metadata, and emits the OpenAPI document.
///
/// Output does not depend on the order operations were added in.
///
/// ```
/// use tailor::{Describe, Document, Operation};
///
/// #[derive(Describe)]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
///
/// let mut doc = Document::new("Users", "User service", "1.0.0");
/// doc.add(Operation::get("/users", "List users").returns::<Vec<User>>());
/// let yaml = doc.to_yaml().unwrap();
/// assert!(yaml.contains("$ref: '#/components/schemas/User'"));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    description: String,
    version: String,
    /// Content type of struct, slice and map bodies. String bodies are always
    /// `text/plain`.
    pub default_content_type: String,
    terms_of_service: String,
    contact: Contact,
    license: License,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    securities: IndexMap<String, SecurityScheme>,
    operations: Vec<Operation>,
    rules: RuleRegistry,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            version: version.into(),
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            terms_of_service: String::new(),
            contact: Contact::default(),
            license: License::default(),
            servers: Vec::new(),
            tags: Vec::new(),
            securities: IndexMap::new(),
            operations: Vec::new(),
            rules: RuleRegistry::new(),
        }
    }

    /// Document seeded from `config`, with one server when a URL is configured.
    #[must_use]
    pub fn from_config(config: &DocumentConfig) -> Self {
        let mut doc = Self::new(
            config.title.as_deref().unwrap_or("API"),
            config.description.as_deref().unwrap_or_default(),
            config.version.as_deref().unwrap_or("0.1.0"),
        );
        if let Some(content_type) = config.content_type.as_deref().filter(|c| !c.is_empty()) {
            doc.default_content_type = content_type.to_string();
        }
        if let Some(url) = config.server_url.as_deref() {
            doc.add_server(url, config.server_description.as_deref().unwrap_or_default());
        }
        doc
    }

    pub fn add(&mut self, operation: Operation) -> &mut Self {
        tracing::debug!(
            method = %operation.method,
            path = %operation.path,
            "adding operation"
        );
        self.operations.push(operation);
        self
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn add_server(&mut self, url: impl Into<String>, description: impl Into<String>) -> &mut Self {
        self.servers.push(Server {
            url: url.into(),
            description: non_empty(description.into()),
        });
        self
    }

    pub fn set_terms_of_service(&mut self, url: impl Into<String>) -> &mut Self {
        self.terms_of_service = url.into();
        self
    }

    pub fn set_contact(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        email: impl Into<String>,
    ) -> &mut Self {
        self.contact = Contact {
            name: non_empty(name.into()),
            url: non_empty(url.into()),
            email: non_empty(email.into()),
        };
        self
    }

    pub fn set_license(&mut self, name: impl Into<String>, url: impl Into<String>) -> &mut Self {
        self.license = License {
            name: non_empty(name.into()),
            url: non_empty(url.into()),
        };
        self
    }

    pub fn add_tag(&mut self, name: impl Into<String>, description: impl Into<String>) -> &mut Self {
        self.tags.push(Tag {
            name: name.into(),
            description: non_empty(description.into()),
        });
        self
    }

    /// HTTP basic authentication, registered as `basicAuth`.
    pub fn add_basic_auth_security(&mut self) -> &mut Self {
        self.add_security("basicAuth", SecurityScheme::http("basic"))
    }

    /// Bearer token authentication with JWTs, registered as `bearerAuth`.
    pub fn add_jwt_security(&mut self) -> &mut Self {
        self.add_security(
            "bearerAuth",
            SecurityScheme::http("bearer").with_bearer_format("JWT"),
        )
    }

    /// API key authentication, registered as `apiKeyAuth`. `location` is
    /// `header`, `query` or `cookie`.
    pub fn add_api_key_security(
        &mut self,
        location: impl AsRef<str>,
        name: impl AsRef<str>,
    ) -> &mut Self {
        self.add_security(
            "apiKeyAuth",
            SecurityScheme::api_key(location.as_ref(), name.as_ref()),
        )
    }

    fn add_security(&mut self, id: &str, scheme: SecurityScheme) -> &mut Self {
        tracing::debug!(id, "adding security scheme");
        self.securities.insert(id.to_string(), scheme);
        self
    }

    /// Render `T` with `rule` wherever it appears. A struct registered here is
    /// treated as a scalar value: never walked and never a component.
    pub fn define_data_type<T: Describe>(&mut self, rule: Rule) -> &mut Self {
        self.define_data_type_for(&TypeDescriptor::of::<T>(), rule)
    }

    pub fn define_data_type_for(&mut self, desc: &TypeDescriptor, rule: Rule) -> &mut Self {
        tracing::debug!(type_name = desc.type_name(), "defining data type");
        self.rules.register(desc, rule);
        self
    }

    /// Fallback rule for every type of `kind` without an exact rule.
    pub fn define_kind(&mut self, kind: Kind, rule: Rule) -> &mut Self {
        tracing::debug!(%kind, "defining kind rule");
        self.rules.register_kind(kind, rule);
        self
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// A new document with the same metadata and rules, holding the operations
    /// for which `select` returns `Some`, as returned. `self` is unchanged.
    #[must_use]
    pub fn select_map(&self, mut select: impl FnMut(Operation) -> Option<Operation>) -> Self {
        let mut derived = self.clone();
        derived.operations.clear();
        for operation in self.operations.iter().cloned() {
            if let Some(operation) = select(operation) {
                derived.add(operation);
            }
        }
        derived
    }

    /// Build the typed document.
    #[tracing::instrument(skip(self), fields(title = %self.title, operations = self.operations.len()))]
    pub fn build(&self) -> Result<OpenApi> {
        let mut doc = OpenApi::new(&self.title, &self.version);
        doc.info.description = non_empty(self.description.clone());
        doc.info.terms_of_service = non_empty(self.terms_of_service.clone());
        doc.info.contact = (!self.contact.is_empty()).then(|| self.contact.clone());
        doc.info.license = (!self.license.is_empty()).then(|| self.license.clone());
        doc.tags = (!self.tags.is_empty()).then(|| self.tags.clone());
        doc.servers = (!self.servers.is_empty()).then(|| self.servers.clone());
        doc.paths = self.paths()?;

        let components = Components {
            schemas: self.schemas()?,
            security_schemes: (!self.securities.is_empty()).then(|| self.securities.clone()),
        };
        doc.components = (!components.is_empty()).then_some(components);
        doc.security = (!self.securities.is_empty()).then(|| {
            self.securities
                .keys()
                .map(|id| SecurityRequirement::from([(id.clone(), Vec::new())]))
                .collect()
        });
        Ok(doc)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.build()?)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.build()?)?)
    }

    /// Write the YAML document with a single write, after it is fully built.
    pub fn write_yaml<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let yaml = self.to_yaml()?;
        writer.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Write the YAML document to `path`, replacing any existing file. Nothing
    /// is written when the build fails.
    pub fn write_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = self.to_yaml()?;
        std::fs::write(path.as_ref(), yaml)?;
        tracing::debug!(path = %path.as_ref().display(), "wrote document");
        Ok(())
    }

    fn paths(&self) -> Result<BTreeMap<String, PathItem>> {
        let mut sorted: Vec<(String, &Operation)> = self
            .operations
            .iter()
            .map(|op| (op.translated_path(), op))
            .collect();
        sorted.sort_by(|(a_path, a), (b_path, b)| {
            a_path
                .cmp(b_path)
                .then_with(|| a.method.weight().cmp(&b.method.weight()))
        });

        let mut renderer = Renderer::new(&self.rules);
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
        for (path, op) in sorted {
            let operation = self.operation(op, &mut renderer)?;
            let item = paths.entry(path.clone()).or_default();
            if item.set_operation(op.method, operation).is_some() {
                return Err(Error::DuplicateOperation {
                    method: op.method,
                    path,
                });
            }
        }
        Ok(paths)
    }

    fn operation(&self, op: &Operation, renderer: &mut Renderer<'_>) -> Result<route::Operation> {
        let operation_id = op.operation_id();

        let request_body = if op.uses_request_body() {
            let schema = renderer.render(&op.params, &expand_always)?;
            Some(RequestBody {
                required: true,
                content: self.content(&op.params, schema),
            })
        } else {
            None
        };

        let mut responses = IndexMap::new();
        for response in op.responses() {
            let code = response.code.to_string();
            let content = if response.body.is_empty() {
                None
            } else {
                let schema = renderer.render(&response.body, &prefer_refs)?;
                Some(self.content(&response.body, schema))
            };
            let response = route::Response {
                description: response.description,
                content,
            };
            if responses.insert(code.clone(), response).is_some() {
                return Err(Error::DuplicateResponse { code, operation_id });
            }
        }

        Ok(route::Operation {
            tags: (!op.tags.is_empty()).then(|| op.tags.clone()),
            parameters: self.parameters(&op.params, renderer)?,
            summary: non_empty(op.summary.clone()),
            description: non_empty(op.description.clone()),
            operation_id,
            request_body,
            responses,
        })
    }

    /// Parameters from the `path`, `query` and `header` tagged fields of a
    /// struct parameter shape.
    fn parameters(
        &self,
        params: &TypeDescriptor,
        renderer: &mut Renderer<'_>,
    ) -> Result<Option<Vec<Parameter>>> {
        if !params.is_kind(Kind::Struct) || self.rules.is_data_type(params) {
            return Ok(None);
        }
        let mut parameters = Vec::new();
        for field in walker::visible_fields(params)? {
            let Some((location, name)) = PARAMETER_LOCATIONS.into_iter().find_map(|location| {
                field
                    .tag(location.tag())
                    .filter(|name| !name.is_empty())
                    .map(|name| (location, name))
            }) else {
                continue;
            };
            parameters.push(Parameter {
                name: name.to_string(),
                r#in: location,
                required: (location == ParameterLocation::Path).then_some(true),
                description: field
                    .tag("description")
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                schema: renderer.render(&field, &expand_always)?,
            });
        }
        Ok((!parameters.is_empty()).then_some(parameters))
    }

    fn schemas(&self) -> Result<Option<IndexMap<String, Schema>>> {
        let roots = self
            .operations
            .iter()
            .flat_map(Operation::responses)
            .map(|response| response.body);
        let components = collect_components(&self.rules, roots)?;

        let mut renderer = Renderer::new(&self.rules);
        let mut schemas = IndexMap::new();
        for component in components {
            let Some(name) = component.name() else {
                continue;
            };
            schemas.insert(
                name.to_string(),
                renderer.render_object(&component, &expand_local)?,
            );
        }
        Ok((!schemas.is_empty()).then_some(schemas))
    }

    fn content(&self, body: &TypeDescriptor, schema: Schema) -> IndexMap<String, MediaType> {
        let content_type = if body.is_kind(Kind::String) {
            TEXT_CONTENT_TYPE
        } else {
            self.default_content_type.as_str()
        };
        IndexMap::from([(content_type.to_string(), MediaType { schema })])
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
