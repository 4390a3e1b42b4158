//! Endpoint definitions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tailor_core::route::HttpMethod;

use crate::descriptor::{Describe, TypeDescriptor};

static PATH_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/:([A-Za-z0-9]+)").expect("path parameter pattern is valid"));

static OPERATION_ID_CLEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9_]").expect("operation id pattern is valid"));

/// Rewrite `/users/:id` style segments as `/users/{id}`. Brace segments pass
/// through unchanged.
#[must_use]
pub fn translate_path(path: &str) -> String {
    PATH_PARAM.replace_all(path, "/{$1}").into_owned()
}

/// Deterministic operation id: the lowercase method followed by each path
/// segment with its first letter uppercased, e.g. `GET /users/:id` gives
/// `getUsersId`.
#[must_use]
pub fn operation_id(method: HttpMethod, path: &str) -> String {
    let path = path.replace(['/', '-'], "_");
    let path = OPERATION_ID_CLEAN.replace_all(&path, "");

    let mut id = method.as_lowercase().to_string();
    for piece in path.trim_matches('_').split('_') {
        let mut chars = piece.chars();
        if let Some(first) = chars.next() {
            id.extend(first.to_uppercase());
            id.push_str(chars.as_str());
        }
    }
    id
}

/// Status code key of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Status(u16),
    /// The `default` response, used for errors
    Default,
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// One explicitly declared response.
#[derive(Debug, Clone)]
pub struct Response {
    pub code: ResponseCode,
    pub description: String,
    /// Body shape; empty for responses without content
    pub body: TypeDescriptor,
}

impl Response {
    pub fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Status(code),
            description: description.into(),
            body: TypeDescriptor::empty(),
        }
    }

    /// A response under the `default` code
    pub fn default_error(description: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Default,
            ..Self::new(0, description)
        }
    }

    #[must_use]
    pub fn body<T: Describe>(self) -> Self {
        self.with_body(TypeDescriptor::of::<T>())
    }

    #[must_use]
    pub fn with_body(mut self, body: TypeDescriptor) -> Self {
        self.body = body;
        self
    }
}

/// What an operation returns on success or on error.
#[derive(Debug, Clone)]
pub enum Returns {
    /// A body shape; the status code and description are filled in
    Shape(TypeDescriptor),
    /// Responses used exactly as given
    Responses(Vec<Response>),
}

impl Default for Returns {
    fn default() -> Self {
        Self::Shape(TypeDescriptor::empty())
    }
}

/// One documented endpoint.
///
/// ```
/// use tailor::{Describe, Operation};
///
/// #[derive(Describe)]
/// pub struct User {
///     pub id: i64,
/// }
///
/// let op = Operation::get("/users/:id", "Get a user").returns::<User>();
/// assert_eq!(op.operation_id(), "getUsersId");
/// assert_eq!(op.translated_path(), "/users/{id}");
/// ```
#[derive(Debug, Clone)]
pub struct Operation {
    pub method: HttpMethod,
    /// Path template, with `:name` or `{name}` parameters
    pub path: String,
    pub summary: String,
    /// Longer description, Markdown allowed
    pub description: String,
    /// Parameter shape; empty when the endpoint takes none
    pub params: TypeDescriptor,
    pub returns_ok: Returns,
    pub returns_err: Returns,
    pub tags: Vec<String>,
}

impl Operation {
    pub fn new(method: HttpMethod, path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            summary: summary.into(),
            description: String::new(),
            params: TypeDescriptor::empty(),
            returns_ok: Returns::default(),
            returns_err: Returns::default(),
            tags: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, summary)
    }

    pub fn post(path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path, summary)
    }

    pub fn put(path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path, summary)
    }

    pub fn patch(path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path, summary)
    }

    pub fn delete(path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path, summary)
    }

    #[must_use]
    pub fn params<T: Describe>(self) -> Self {
        self.with_params(TypeDescriptor::of::<T>())
    }

    #[must_use]
    pub fn returns<T: Describe>(self) -> Self {
        self.with_returns(TypeDescriptor::of::<T>())
    }

    #[must_use]
    pub fn errors<T: Describe>(self) -> Self {
        self.with_errors(TypeDescriptor::of::<T>())
    }

    #[must_use]
    pub fn with_params(mut self, params: TypeDescriptor) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_returns(mut self, body: TypeDescriptor) -> Self {
        self.returns_ok = Returns::Shape(body);
        self
    }

    #[must_use]
    pub fn with_errors(mut self, body: TypeDescriptor) -> Self {
        self.returns_err = Returns::Shape(body);
        self
    }

    #[must_use]
    pub fn with_response(self, response: Response) -> Self {
        self.with_responses(vec![response])
    }

    #[must_use]
    pub fn with_responses(mut self, responses: Vec<Response>) -> Self {
        self.returns_ok = Returns::Responses(responses);
        self
    }

    #[must_use]
    pub fn with_error_response(self, response: Response) -> Self {
        self.with_error_responses(vec![response])
    }

    #[must_use]
    pub fn with_error_responses(mut self, responses: Vec<Response>) -> Self {
        self.returns_err = Returns::Responses(responses);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn add_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn operation_id(&self) -> String {
        operation_id(self.method, &self.path)
    }

    #[must_use]
    pub fn translated_path(&self) -> String {
        translate_path(&self.path)
    }

    /// Only POST and PUT with parameters carry a request body.
    #[must_use]
    pub fn uses_request_body(&self) -> bool {
        self.method.takes_body() && !self.params.is_empty()
    }

    /// Success responses followed by error responses.
    ///
    /// A success shape becomes `204` when empty, `201` for POST and `200`
    /// otherwise. An error shape becomes the `default` response.
    #[must_use]
    pub fn responses(&self) -> Vec<Response> {
        let mut responses = match &self.returns_ok {
            Returns::Responses(responses) => responses.clone(),
            Returns::Shape(body) if body.is_empty() => {
                vec![Response::new(204, "The operation completed successfully.")]
            }
            Returns::Shape(body) => {
                let code = if self.method == HttpMethod::Post { 201 } else { 200 };
                vec![Response::new(code, "ok response").with_body(body.clone())]
            }
        };
        match &self.returns_err {
            Returns::Responses(errors) => responses.extend(errors.iter().cloned()),
            Returns::Shape(body) => {
                responses.push(Response::default_error("error response").with_body(body.clone()));
            }
        }
        responses
    }
}
