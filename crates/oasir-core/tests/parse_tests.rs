use oasir_core::parse;
use oasir_core::parse::operation::ResponseOrRef;
use oasir_core::parse::parameter::ParameterOrRef;
use oasir_core::parse::schema::{SchemaOrRef, SchemaType};
use oasir_core::validate::{Severity, validate};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const COLLISIONS: &str = include_str!("fixtures/collisions.yaml");

#[test]
fn parse_petstore_yaml() {
    let spec = parse::from_yaml(PETSTORE).expect("should parse petstore");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Petstore");
    assert_eq!(spec.paths.len(), 4);
    assert_eq!(spec.servers[0].url, "https://petstore.example.com/v1");

    let list = spec.paths["/pets"].get.as_ref().expect("should have GET /pets");
    assert_eq!(list.operation_id.as_deref(), Some("listPets"));
    // `200:` is an integer key in the fixture.
    let codes: Vec<_> = list.responses.keys().map(String::as_str).collect();
    assert_eq!(codes, ["default", "200"]);
    match &list.responses["200"] {
        ResponseOrRef::Response(r) => {
            assert!(r.content.contains_key("application/json"));
            assert!(r.headers.contains_key("x-next"));
        }
        ResponseOrRef::Ref { .. } => panic!("expected inline response"),
    }
}

#[test]
fn parse_refs_and_components() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let item = &spec.paths["/pets/{petId}"];
    assert!(matches!(
        &item.parameters[0],
        ParameterOrRef::Ref { ref_path } if ref_path == "#/components/parameters/PetId"
    ));

    let components = spec.components.as_ref().unwrap();
    assert_eq!(components.schemas.len(), 10);
    assert_eq!(components.security_schemes.len(), 2);

    let SchemaOrRef::Schema(pet) = &components.schemas["Pet"] else {
        panic!("Pet should be inline");
    };
    assert_eq!(pet.primary_type(), Some(SchemaType::Object));
    assert_eq!(pet.required, ["id", "name"]);
    assert_eq!(pet.properties.len(), 8);
}

#[test]
fn parse_json_document() {
    let json = r#"{
        "openapi": "3.1.0",
        "info": { "title": "Json", "version": "1" },
        "paths": {
            "/ping": { "get": { "responses": { "204": { "description": "pong" } } } }
        }
    }"#;
    let spec = parse::from_json(json).unwrap();
    assert_eq!(spec.info.title, "Json");
    assert!(spec.paths["/ping"].get.is_some());
}

#[test]
fn validate_petstore_reports_only_unused_models() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let issues = validate(&spec);
    assert!(issues.iter().all(|i| i.severity == Severity::Warning));

    let unused: Vec<_> = issues.iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        unused,
        [
            "Unused model: Circle",
            "Unused model: Dog",
            "Unused model: Node",
            "Unused model: Reaction",
            "Unused model: Shape",
            "Unused model: Square",
        ]
    );
}

#[test]
fn validate_reports_duplicate_operation_ids() {
    let spec = parse::from_yaml(COLLISIONS).unwrap();
    let issues: Vec<String> = validate(&spec).iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(issues.join("\n"), @r"
    error: GET /pets/all: duplicate operationId `listPets` (first declared at GET /pets)
    error: GET /animals: duplicate operationId `listPets` (first declared at GET /pets)
    error: GET /v2/pets: duplicate operationId `listPets` (first declared at GET /pets)
    ");
}
