use serde::Serialize;
use tailor::{Describe, Document, Operation, Response};

#[derive(Describe, Serialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub tag: String,
}

#[derive(Describe, Serialize)]
#[describe(name = "Error")]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

#[derive(Describe)]
pub struct FindPetsParams {
    /// tags to filter by
    #[describe(query = "tags")]
    pub tags: Vec<String>,
    #[describe(query = "limit", description = "maximum number of results to return")]
    pub limit: i32,
}

#[derive(Describe)]
pub struct NewPet {
    pub name: String,
    pub tag: String,
}

#[derive(Describe)]
pub struct FetchPetParams {
    #[describe(path = "id", description = "ID of pet to fetch")]
    pub id: i64,
}

#[derive(Describe)]
pub struct DeletePetParams {
    #[describe(path = "id", description = "ID of pet to delete")]
    pub id: i64,
}

fn petstore() -> Document {
    let mut doc = Document::new(
        "Swagger Petstore",
        "A sample API that uses a petstore as an example to demonstrate features in the OpenAPI 3.0 specification",
        "1.0.0",
    );
    doc.add_api_key_security("header", "api_key")
        .set_terms_of_service("http://swagger.io/terms/")
        .set_contact("", "", "apiteam@swagger.io")
        .set_license("Apache 2.0", "http://www.apache.org/licenses/LICENSE-2.0.html")
        .add_server("http://petstore.swagger.io/api", "Public API server")
        .add_tag("pet", "Everything about your Pets")
        .add_tag("store", "Access to Petstore orders")
        .add_tag("user", "Operations about user");
    doc
}

fn routes() -> Vec<Operation> {
    vec![
        Operation::get(
            "/pets",
            "Returns all pets from the system that the user has access to",
        )
        .params::<FindPetsParams>()
        .returns::<Vec<Pet>>()
        .errors::<ApiError>(),
        Operation::post("/pets", "Creates a new pet in the store.  Duplicates are allowed")
            .params::<NewPet>()
            .with_response(Response::new(200, "pet response").body::<Pet>())
            .errors::<ApiError>(),
        Operation::get(
            "/pets/:id",
            "Returns a user based on a single ID, if the user does not have access to the pet",
        )
        .params::<FetchPetParams>()
        .returns::<Pet>()
        .errors::<ApiError>(),
        Operation::delete("/pets/:id", "deletes a single pet based on the ID supplied")
            .params::<DeletePetParams>()
            .errors::<ApiError>(),
    ]
}

const EXPECTED: &str = r##"
openapi: 3.0.0
info:
  title: Swagger Petstore
  description: A sample API that uses a petstore as an example to demonstrate features in the OpenAPI 3.0 specification
  termsOfService: http://swagger.io/terms/
  contact:
    email: apiteam@swagger.io
  license:
    name: Apache 2.0
    url: http://www.apache.org/licenses/LICENSE-2.0.html
  version: 1.0.0
tags:
  - name: pet
    description: Everything about your Pets
  - name: store
    description: Access to Petstore orders
  - name: user
    description: Operations about user
servers:
  - url: http://petstore.swagger.io/api
    description: Public API server
paths:
  /pets:
    get:
      operationId: getPets
      summary: Returns all pets from the system that the user has access to
      parameters:
        - name: tags
          in: query
          description: tags to filter by
          schema:
            type: array
            items:
              type: string
        - name: limit
          in: query
          description: maximum number of results to return
          schema:
            type: integer
            format: int32
      responses:
        '200':
          description: ok response
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
        default:
          description: error response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
    post:
      operationId: postPets
      summary: Creates a new pet in the store.  Duplicates are allowed
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              properties:
                name:
                  type: string
                tag:
                  type: string
      responses:
        '200':
          description: pet response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        default:
          description: error response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
  /pets/{id}:
    get:
      operationId: getPetsId
      summary: Returns a user based on a single ID, if the user does not have access to the pet
      parameters:
        - name: id
          in: path
          required: true
          description: ID of pet to fetch
          schema:
            type: integer
            format: int64
      responses:
        '200':
          description: ok response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        default:
          description: error response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
    delete:
      operationId: deletePetsId
      summary: deletes a single pet based on the ID supplied
      parameters:
        - name: id
          in: path
          required: true
          description: ID of pet to delete
          schema:
            type: integer
            format: int64
      responses:
        '204':
          description: The operation completed successfully.
        default:
          description: error response
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
components:
  schemas:
    Error:
      type: object
      properties:
        code:
          type: integer
          format: int32
        message:
          type: string
    Pet:
      type: object
      properties:
        id:
          type: integer
          format: int64
        name:
          type: string
        tag:
          type: string
  securitySchemes:
    apiKeyAuth:
      type: apiKey
      in: header
      name: api_key
security:
  - apiKeyAuth: []
"##;

fn parse(yaml: &str) -> serde_yaml::Value {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn petstore_document() {
    let mut doc = petstore();
    for route in routes() {
        doc.add(route);
    }
    let yaml = doc.to_yaml().unwrap();
    assert_eq!(parse(&yaml), parse(EXPECTED), "{yaml}");
}

#[test]
fn petstore_sections_in_order() {
    let mut doc = petstore();
    for route in routes() {
        doc.add(route);
    }
    let yaml = doc.to_yaml().unwrap();
    let positions: Vec<usize> = [
        "openapi:",
        "info:",
        "tags:",
        "servers:",
        "paths:",
        "  /pets:",
        "    get:",
        "    post:",
        "  /pets/{id}:",
        "    delete:",
        "components:",
        "    Error:",
        "    Pet:",
        "  securitySchemes:",
        "security:",
    ]
    .iter()
    .map(|needle| {
        yaml.find(needle)
            .unwrap_or_else(|| panic!("missing {needle} in\n{yaml}"))
    })
    .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "{yaml}");
}

#[test]
fn petstore_is_independent_of_registration_order() {
    let mut forward = petstore();
    for route in routes() {
        forward.add(route);
    }
    let mut backward = petstore();
    for route in routes().into_iter().rev() {
        backward.add(route);
    }
    assert_eq!(forward.to_yaml().unwrap(), backward.to_yaml().unwrap());
}

#[test]
fn petstore_models_serialize_as_documented() {
    // The documented property names are the ones serde writes.
    let pet = serde_json::to_value(Pet {
        id: 1,
        name: "Rex".to_string(),
        tag: "dog".to_string(),
    })
    .unwrap();
    let mut keys: Vec<&String> = pet.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, ["id", "name", "tag"]);

    let err = serde_json::to_value(ApiError {
        code: 404,
        message: "not found".to_string(),
    })
    .unwrap();
    assert_eq!(err["code"], 404);
}
