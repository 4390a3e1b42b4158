use std::collections::HashMap;

use serde::Serialize;
use serde_yaml::Value;
use tailor::render::{Renderer, prefer_refs};
use tailor::rules::{self, Rule};
use tailor::{
    Describe, Document, Error, HttpMethod, Kind, Operation, Response, RuleRegistry,
    TypeDescriptor,
};

#[derive(Describe, Serialize)]
pub struct User {
    #[serde(rename = "id")]
    pub user_id: i64,
    pub name: String,
}

#[derive(Describe, Serialize)]
pub struct ErrorModel {
    pub message: String,
    pub code: i32,
}

fn document() -> Document {
    Document::new("SwaggerGenAPI", "Demonstrate auto-generating Swagger", "0.1.9")
}

fn parse(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

fn emitted(doc: &Document) -> Value {
    parse(&doc.to_yaml().unwrap())
}

fn schemas(doc: &Document) -> Value {
    emitted(doc)["components"]["schemas"].clone()
}

fn keys(mapping: &Value) -> Vec<String> {
    mapping
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn basic_endpoint() {
    let mut doc = document();
    doc.add(
        Operation::get("/users", "List users")
            .returns::<Vec<User>>()
            .errors::<ErrorModel>(),
    );
    let yaml = doc.to_yaml().unwrap();
    let value = parse(&yaml);

    let responses = &value["paths"]["/users"]["get"]["responses"];
    assert_eq!(
        responses["200"]["content"]["application/json"]["schema"],
        parse("type: array\nitems:\n  $ref: '#/components/schemas/User'")
    );
    assert_eq!(
        responses["default"]["content"]["application/json"]["schema"],
        parse("$ref: '#/components/schemas/ErrorModel'")
    );
    assert_eq!(
        value["components"]["schemas"],
        parse(
            "
ErrorModel:
  type: object
  properties:
    message:
      type: string
    code:
      type: integer
      format: int32
User:
  type: object
  properties:
    id:
      type: integer
      format: int64
    name:
      type: string
"
        )
    );
    assert!(yaml.find("    ErrorModel:").unwrap() < yaml.find("    User:").unwrap());
}

#[test]
fn no_body_success_defaults_to_204() {
    let mut doc = document();
    doc.add(Operation::post("/checkin", ""));
    let value = emitted(&doc);
    let op = &value["paths"]["/checkin"]["post"];

    assert_eq!(op["operationId"], Value::from("postCheckin"));
    assert!(op.get("requestBody").is_none());
    assert!(op.get("summary").is_none());
    assert_eq!(
        op["responses"],
        parse(
            "
'204':
  description: The operation completed successfully.
default:
  description: error response
"
        )
    );
}

#[test]
fn post_with_payload_defaults_to_201() {
    let mut doc = document();
    doc.add(Operation::post("/users", "Create").params::<User>().returns::<User>());
    let value = emitted(&doc);
    let responses = &value["paths"]["/users"]["post"]["responses"];
    assert_eq!(keys(responses), ["201", "default"]);
}

#[derive(Describe)]
pub struct Toggle {
    pub on: bool,
    pub since: String,
}

#[derive(Describe)]
pub struct Settings {
    pub toggle: Toggle,
    pub history: Vec<Toggle>,
}

#[test]
fn custom_data_type_renders_as_its_rule() {
    let mut doc = document();
    doc.define_data_type::<Toggle>(rules::fixed("boolean", ""));
    doc.add(Operation::get("/settings", "Settings").returns::<Settings>());
    let yaml = doc.to_yaml().unwrap();

    assert_eq!(
        parse(&yaml)["components"]["schemas"],
        parse(
            "
Settings:
  type: object
  properties:
    toggle:
      type: boolean
    history:
      type: array
      items:
        type: boolean
"
        )
    );
    assert!(!yaml.contains("Toggle"), "{yaml}");
}

fn operations() -> Vec<Operation> {
    vec![
        Operation::get("/users", "List users").returns::<Vec<User>>(),
        Operation::post("/users", "Create user")
            .params::<User>()
            .returns::<User>()
            .errors::<ErrorModel>(),
        Operation::get("/users/:id", "Get user").returns::<User>(),
        Operation::delete("/users/:id", "Delete user").errors::<ErrorModel>(),
        Operation::put("/settings", "Save settings").params::<Settings>(),
        Operation::get("/health", "Health").returns::<String>(),
    ]
}

#[test]
fn output_is_independent_of_insertion_order() {
    let build = |ops: Vec<Operation>| {
        let mut doc = document();
        for op in ops {
            doc.add(op);
        }
        doc.to_yaml().unwrap()
    };
    let expected = build(operations());
    for shift in 1..operations().len() {
        let mut ops = operations();
        ops.rotate_left(shift);
        assert_eq!(build(ops), expected, "rotated by {shift}");
    }
    let mut reversed = operations();
    reversed.reverse();
    assert_eq!(build(reversed), expected);
}

#[test]
fn paths_sort_by_path_then_method() {
    let mut doc = document();
    for op in operations() {
        doc.add(op);
    }
    let value = emitted(&doc);
    assert_eq!(keys(&value["paths"]), ["/health", "/settings", "/users", "/users/{id}"]);
    assert_eq!(keys(&value["paths"]["/users"]), ["get", "post"]);
    assert_eq!(keys(&value["paths"]["/users/{id}"]), ["get", "delete"]);
}

#[test]
fn shared_types_become_one_component() {
    let mut doc = document();
    doc.add(Operation::get("/users", "List").returns::<Vec<User>>());
    doc.add(Operation::get("/users/:id", "Get").returns::<User>());
    doc.add(Operation::get("/me", "Me").returns::<Option<Box<User>>>());
    assert_eq!(keys(&schemas(&doc)), ["User"]);
}

#[derive(Describe)]
pub struct Inner {
    pub value: String,
}

#[derive(Describe)]
pub struct Plain {
    pub count: i64,
    pub inner: Inner,
    pub items: Vec<Inner>,
}

#[derive(Describe)]
pub struct Pointers {
    pub count: Option<i64>,
    pub inner: Option<Box<Inner>>,
    pub items: Option<Vec<Inner>>,
}

#[test]
fn optional_fields_only_add_nullable() {
    let mut doc = document();
    doc.add(Operation::get("/plain", "Plain").returns::<Plain>());
    doc.add(Operation::get("/pointers", "Pointers").returns::<Pointers>());
    let schemas = schemas(&doc);
    let plain = &schemas["Plain"]["properties"];
    let pointers = &schemas["Pointers"]["properties"];

    assert_eq!(plain["count"], parse("type: integer\nformat: int64"));
    assert_eq!(
        pointers["count"],
        parse("type: integer\nformat: int64\nnullable: true")
    );
    assert_eq!(plain["inner"], pointers["inner"]);
    assert_eq!(plain["items"], pointers["items"]);
    assert_eq!(keys(&schemas), ["Inner", "Plain", "Pointers"]);
}

#[derive(Describe)]
pub struct Audit {
    pub created_by: String,
    pub version: i32,
}

#[derive(Describe)]
pub struct Article {
    pub title: String,
    #[serde(flatten)]
    pub audit: Audit,
    pub body: String,
}

#[test]
fn embedded_fields_are_spliced_in_place() {
    let mut doc = document();
    doc.add(Operation::get("/articles/:id", "Get").returns::<Article>());
    let schemas = schemas(&doc);

    assert_eq!(
        keys(&schemas["Article"]["properties"]),
        ["title", "created_by", "version", "body"]
    );
    // The embedded struct is not referenced on its own.
    assert_eq!(keys(&schemas), ["Article"]);
}

#[derive(Describe)]
pub struct Nothing {}

#[derive(Describe)]
pub struct Holder {
    pub nothing: Nothing,
    pub many: Vec<Nothing>,
}

#[test]
fn empty_structs_are_bare_objects() {
    let mut doc = document();
    doc.add(Operation::get("/holder", "Holder").returns::<Holder>());
    doc.add(Operation::get("/nothing", "Nothing").returns::<Nothing>());
    let value = emitted(&doc);
    let object = parse("type: object");

    let schemas = &value["components"]["schemas"];
    assert_eq!(schemas["Nothing"], object);
    assert_eq!(schemas["Holder"]["properties"]["nothing"], object);
    assert_eq!(
        schemas["Holder"]["properties"]["many"],
        parse("type: array\nitems:\n  type: object")
    );
    assert_eq!(
        value["paths"]["/nothing"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"],
        object
    );
}

#[derive(Describe)]
pub struct Misc {
    pub labels: HashMap<String, String>,
    pub extra: serde_json::Value,
    pub price: Cents,
    pub status: Status,
    pub updated: chrono::DateTime<chrono::Utc>,
    pub born: chrono::NaiveDate,
}

#[derive(Describe)]
pub struct Cents(pub i64);

#[derive(Describe)]
pub enum Status {
    Available,
    Sold,
}

#[test]
fn maps_values_newtypes_enums_and_dates() {
    let mut doc = document();
    doc.add(Operation::get("/misc", "Misc").returns::<Misc>());
    let schemas = schemas(&doc);
    let properties = &schemas["Misc"]["properties"];

    assert_eq!(properties["labels"], parse("type: object"));
    assert_eq!(properties["extra"], parse("{}"));
    assert_eq!(properties["price"], parse("type: integer\nformat: int64"));
    assert_eq!(properties["status"], parse("type: string"));
    assert_eq!(properties["updated"], parse("type: string\nformat: date-time"));
    assert_eq!(properties["born"], parse("type: string\nformat: date"));
    assert_eq!(keys(&schemas), ["Misc"]);
}

#[derive(Describe)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[test]
fn generic_structs_reference_their_arguments() {
    let mut doc = document();
    doc.add(Operation::get("/users", "List").returns::<Page<User>>());
    let schemas = schemas(&doc);
    assert_eq!(keys(&schemas), ["Page", "User"]);
    assert_eq!(
        schemas["Page"]["properties"]["items"],
        parse("type: array\nitems:\n  $ref: '#/components/schemas/User'")
    );
    assert_eq!(
        schemas["Page"]["properties"]["next"],
        parse("type: string\nnullable: true")
    );
}

#[derive(Describe)]
pub struct CreateUser {
    #[describe(header = "X-Request-Id", description = "Idempotency key.")]
    pub request_id: String,
    pub name: String,
    pub tags: Vec<Tag>,
}

#[derive(Describe)]
pub struct Tag {
    #[serde(rename = "tagName")]
    pub tag_name: String,
}

#[test]
fn request_bodies_expand_nested_structs() {
    let mut doc = document();
    doc.add(
        Operation::post("/users", "Create a user.")
            .params::<CreateUser>()
            .errors::<ErrorModel>(),
    );
    let value = emitted(&doc);
    let op = &value["paths"]["/users"]["post"];

    assert_eq!(
        op["parameters"],
        parse(
            "
- name: X-Request-Id
  in: header
  description: Idempotency key.
  schema:
    type: string
"
        )
    );
    assert_eq!(
        op["requestBody"],
        parse(
            "
required: true
content:
  application/json:
    schema:
      type: object
      properties:
        name:
          type: string
        tags:
          type: array
          items:
            type: object
            properties:
              tagName:
                type: string
"
        )
    );
    // Success shape is empty, so this POST still gets a 204.
    assert_eq!(keys(&op["responses"]), ["204", "default"]);
}

#[test]
fn explicit_responses_replace_defaults() {
    let mut doc = document();
    doc.add(
        Operation::get("/users/:id", "Get")
            .with_responses(vec![
                Response::new(200, "found").body::<User>(),
                Response::new(304, "not modified"),
            ])
            .with_error_responses(vec![
                Response::new(404, "missing").body::<ErrorModel>(),
                Response::default_error("unexpected").body::<ErrorModel>(),
            ]),
    );
    let value = emitted(&doc);
    let responses = &value["paths"]["/users/{id}"]["get"]["responses"];
    assert_eq!(keys(responses), ["200", "304", "404", "default"]);
    assert_eq!(responses["304"], parse("description: not modified"));
    assert_eq!(responses["default"]["description"], Value::from("unexpected"));
}

#[test]
fn description_and_tags_are_emitted() {
    let mut doc = document();
    doc.add(
        Operation::get("/users", "List")
            .with_description("Lists **all** users.")
            .add_tags(["users", "admin"]),
    );
    let op = &emitted(&doc)["paths"]["/users"]["get"];
    assert_eq!(op["description"], Value::from("Lists **all** users."));
    assert_eq!(op["tags"], parse("[users, admin]"));
}

#[test]
fn select_map_builds_a_filtered_document() {
    let mut doc = document();
    for op in operations() {
        doc.add(op.add_tags(["all"]));
    }
    doc.add(Operation::get("/admin", "Admin").add_tags(["internal"]));

    let public = doc.select_map(|op| {
        (!op.tags.iter().any(|t| t == "internal")).then(|| op.with_description("Public."))
    });
    let value = emitted(&public);
    assert!(value["paths"].get("/admin").is_none());
    assert_eq!(
        value["paths"]["/health"]["get"]["description"],
        Value::from("Public.")
    );
    assert!(emitted(&doc)["paths"].get("/admin").is_some());
}

#[test]
fn security_schemes_and_requirements() {
    let mut doc = document();
    doc.add_jwt_security().add_basic_auth_security();
    let value = emitted(&doc);
    assert_eq!(
        value["components"]["securitySchemes"],
        parse(
            "
bearerAuth:
  type: http
  scheme: bearer
  bearerFormat: JWT
basicAuth:
  type: http
  scheme: basic
"
        )
    );
    assert_eq!(value["security"], parse("- bearerAuth: []\n- basicAuth: []"));
    assert_eq!(keys(&value["components"]["securitySchemes"]), ["bearerAuth", "basicAuth"]);
}

mod billing {
    use tailor::Describe;

    #[derive(Describe)]
    pub struct User {
        pub plan: String,
    }
}

#[derive(Describe)]
pub struct Account {
    pub owner: User,
    pub billing: billing::User,
}

#[test]
fn component_name_collisions_are_rejected() {
    let mut doc = document();
    doc.add(Operation::get("/account", "Account").returns::<Account>());
    match doc.to_yaml().unwrap_err() {
        Error::SchemaNameCollision { name, .. } => assert_eq!(name, "User"),
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Describe)]
#[describe(inline)]
pub struct Tree {
    pub label: String,
    pub children: Vec<Tree>,
}

#[derive(Describe)]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
}

#[test]
fn recursive_types_need_a_name() {
    let mut doc = document();
    doc.add(Operation::get("/node", "Node").returns::<Node>());
    let schemas = schemas(&doc);
    assert_eq!(
        schemas["Node"]["properties"]["children"],
        parse("type: array\nitems:\n  $ref: '#/components/schemas/Node'")
    );

    let mut doc = document();
    doc.add(Operation::get("/tree", "Tree").returns::<Tree>());
    let err = doc.to_yaml().unwrap_err();
    assert!(matches!(err, Error::RecursiveType { .. }), "{err}");
}

#[derive(Describe)]
pub struct Loose {
    pub id: i64,
    #[serde(flatten)]
    pub rest: HashMap<String, String>,
}

#[test]
fn flattening_a_map_is_rejected() {
    let mut doc = document();
    doc.add(Operation::get("/loose", "Loose").returns::<Loose>());
    let err = doc.to_yaml().unwrap_err();
    match err {
        Error::FlattenNonStruct { field, .. } => assert_eq!(field, "rest"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_rule_names_kind_and_type() {
    let rules = RuleRegistry::empty();
    let mut renderer = Renderer::new(&rules);
    let err = renderer
        .render(&TypeDescriptor::of::<u16>(), &prefer_refs)
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported { kind: Kind::U16, .. }));
    let message = err.to_string();
    assert!(message.contains("u16"), "{message}");
}

#[test]
fn duplicate_routes_are_rejected_in_any_order() {
    for (first, second) in [("/users/:id", "/users/{id}"), ("/users/{id}", "/users/:id")] {
        let mut doc = document();
        doc.add(Operation::get(first, "one"));
        doc.add(Operation::post("/users", "create"));
        doc.add(Operation::get(second, "two"));
        match doc.build().unwrap_err() {
            Error::DuplicateOperation { method, path } => {
                assert_eq!(method, HttpMethod::Get);
                assert_eq!(path, "/users/{id}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn write_yaml_file_replaces_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.yaml");
    std::fs::write(&path, "x".repeat(64 * 1024)).unwrap();

    let mut doc = document();
    doc.add(Operation::get("/users", "List").returns::<Vec<User>>());
    doc.write_yaml_file(&path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, doc.to_yaml().unwrap());
}

#[test]
fn failed_build_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.yaml");
    std::fs::write(&path, "previous").unwrap();

    let mut doc = document();
    doc.add(Operation::get("/a", "a"));
    doc.add(Operation::get("/a", "b"));
    assert!(doc.write_yaml_file(&path).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
}

/// Maps `validate = "min=1,max=5"` style tags to schema bounds.
fn validations() -> Rule {
    Rule::new(|desc, attributes| {
        let Some(validate) = desc.tag("validate") else {
            return;
        };
        let is_string = desc.is_kind(Kind::String);
        for validation in validate.split(',') {
            let (key, value) = validation.split_once('=').unwrap_or((validation, ""));
            match key {
                "len" => {
                    attributes.set("minLength", value);
                    attributes.set("maxLength", value);
                }
                "min" if is_string => attributes.set("minLength", value),
                "max" if is_string => attributes.set("maxLength", value),
                "min" => attributes.set("min", value),
                "max" => attributes.set("max", value),
                "regexp" => attributes.set("pattern", value),
                "nonzero" => attributes.set("required", "true"),
                _ => {}
            }
        }
    })
}

#[derive(Describe)]
pub struct Validated {
    #[describe(query = "minmaxstr", validate = "min=1,max=5")]
    pub minmax_str: String,
    #[describe(query = "minmaxnum", validate = "min=1,max=5.5")]
    pub minmax_num: f32,
    #[describe(query = "regexp", validate = "regexp=.*[wy](i|o)bble$")]
    pub regexp: String,
    #[describe(query = "len", validate = "len=4")]
    pub len: String,
    #[describe(query = "nonzero", validate = "nonzero")]
    pub nonzero: String,
}

#[test]
fn builtin_rules_extended_with_validation_tags() {
    let mut doc = document();
    for desc in rules::builtin_types() {
        doc.define_data_type_for(&desc, rules::builtin_for(&desc, [validations()]));
    }
    doc.add(Operation::get("/empty", "").params::<Validated>());
    let yaml = doc.to_yaml().unwrap();

    assert_eq!(
        parse(&yaml)["paths"]["/empty"]["get"]["parameters"],
        parse(
            r"
- name: minmaxstr
  in: query
  schema:
    type: string
    maxLength: 5
    minLength: 1
- name: minmaxnum
  in: query
  schema:
    type: number
    format: float
    max: 5.5
    min: 1
- name: regexp
  in: query
  schema:
    type: string
    pattern: .*[wy](i|o)bble$
- name: len
  in: query
  schema:
    type: string
    maxLength: 4
    minLength: 4
- name: nonzero
  in: query
  schema:
    type: string
    required: true
"
        )
    );
    // Attributes after `type` are written alphabetically.
    assert!(yaml.find("maxLength: 5").unwrap() < yaml.find("minLength: 1").unwrap());
}

#[test]
fn config_driven_document() {
    let config = tailor::config::DocumentConfig::default()
        .with_title("Pets")
        .with_fallbacks_from(|key| match key {
            "TAILOR_VERSION" => Some("3.2.1".to_string()),
            "TAILOR_SERVER_URL" => Some("https://pets.example.com".to_string()),
            _ => None,
        });
    let doc = Document::from_config(&config);
    let value = emitted(&doc);
    assert_eq!(value["info"], parse("title: Pets\nversion: 3.2.1"));
    assert_eq!(value["servers"], parse("- url: https://pets.example.com"));
}

#[derive(Describe)]
pub struct SearchParams {
    #[describe(query = "code", default = "0123")]
    pub code: String,
    #[describe(query = "flag", default = "true")]
    pub flag: String,
    #[describe(query = "price", default = "1.50")]
    pub price: String,
    #[describe(query = "limit", default = "10")]
    pub limit: i32,
}

#[test]
fn string_defaults_stay_strings() {
    let mut doc = document();
    doc.add(Operation::get("/search", "").params::<SearchParams>());
    let yaml = doc.to_yaml().unwrap();

    assert_eq!(
        parse(&yaml)["paths"]["/search"]["get"]["parameters"],
        parse(
            r"
- name: code
  in: query
  schema:
    type: string
    default: '0123'
- name: flag
  in: query
  schema:
    type: string
    default: 'true'
- name: price
  in: query
  schema:
    type: string
    default: '1.50'
- name: limit
  in: query
  schema:
    type: integer
    format: int32
    default: 10
"
        ),
        "{yaml}"
    );
}

#[derive(Describe)]
pub struct Window {
    pub from: i64,
    pub to: i64,
}

#[derive(Describe)]
pub struct RangeParams {
    #[describe(query = "window")]
    pub window: Window,
    #[describe(query = "windows")]
    pub windows: Vec<Window>,
}

#[test]
fn struct_typed_parameters_are_inlined() {
    let mut doc = document();
    doc.add(Operation::get("/range", "").params::<RangeParams>());
    let value = emitted(&doc);

    let window = parse(
        r"
type: object
properties:
  from:
    type: integer
    format: int64
  to:
    type: integer
    format: int64
",
    );
    let params = &value["paths"]["/range"]["get"]["parameters"];
    assert_eq!(params[0]["schema"], window);
    assert_eq!(params[1]["schema"]["type"], "array");
    assert_eq!(params[1]["schema"]["items"], window);
    assert!(value["components"].is_null(), "{value:?}");
}

#[derive(Describe)]
#[allow(dead_code)]
struct Secret {
    pub note: String,
    pub owner: User,
}

#[derive(Describe)]
#[allow(private_interfaces)]
pub struct Envelope {
    pub id: i64,
    pub secret: Secret,
    pub history: Vec<Secret>,
}

#[test]
fn private_structs_are_inlined_into_components() {
    let mut doc = document();
    doc.add(Operation::get("/envelopes/:id", "").returns::<Envelope>());
    doc.add(Operation::get("/secrets", "").returns::<Vec<Secret>>());
    let value = emitted(&doc);
    let schemas = &value["components"]["schemas"];

    assert_eq!(keys(schemas), ["Envelope", "User"]);
    let secret = parse(
        r"
type: object
properties:
  note:
    type: string
  owner:
    $ref: '#/components/schemas/User'
",
    );
    assert_eq!(schemas["Envelope"]["properties"]["secret"], secret);
    assert_eq!(schemas["Envelope"]["properties"]["history"]["items"], secret);

    let listed = &value["paths"]["/secrets"]["get"]["responses"]["200"]["content"]
        ["application/json"]["schema"];
    assert_eq!(listed["items"]["type"], "object");
    assert_eq!(listed["items"]["properties"]["note"], parse("type: string"));
}
