//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: the estimation, health and version endpoints
//! - **Schemas**: wire-shape wrappers from `inbound::http::schemas`, so domain
//!   types stay free of utoipa derives
//! - **Security**: the HTTP Basic scheme guarding the estimation endpoints
//!
//! The document is served at `/api-docs.json`, browsed through Swagger UI at
//! `/api-docs/`, and exported by `cargo run --bin openapi-dump`.

use serde_json::Value;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{
    CarbonEstimateSchema, ErrorResponseSchema, EstimateRequestSchema, HealthSchema,
    ImageUploadSchema, IngredientSchema, VersionSchema,
};

/// OpenAPI version advertised in the served document.
///
/// utoipa emits 3.1 schemas, where an `Option` field becomes a `type` array
/// that 3.0 readers reject. Wire schemas therefore use plain types and mark
/// optional fields with `required = false`.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Name of the Basic authentication security scheme.
pub const BASIC_AUTH_SCHEME: &str = "basicAuth";

/// Enrich the generated document with the Basic authentication scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BASIC_AUTH_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Carbon Footprint API",
        version = "1.0.0",
        description = "API for calculating and tracking carbon footprint of food items"
    ),
    servers(
        (url = "http://localhost:3000", description = "Development server")
    ),
    security(("basicAuth" = [])),
    paths(
        crate::inbound::http::estimate::estimate,
        crate::inbound::http::estimate::upload,
        crate::inbound::http::health::health,
        crate::inbound::http::health::version,
    ),
    components(schemas(
        CarbonEstimateSchema,
        IngredientSchema,
        ErrorResponseSchema,
        EstimateRequestSchema,
        ImageUploadSchema,
        HealthSchema,
        VersionSchema
    )),
    tags(
        (name = "estimation", description = "Carbon footprint estimation"),
        (name = "health", description = "Service health and version")
    )
)]
pub struct ApiDoc;

/// Serialise [`ApiDoc`] with the `openapi` field pinned to
/// [`OPENAPI_VERSION`].
///
/// # Errors
/// Propagates serialisation failures.
pub fn openapi_document() -> Result<Value, serde_json::Error> {
    let mut document = serde_json::to_value(ApiDoc::openapi())?;
    if let Some(object) = document.as_object_mut() {
        object.insert(
            "openapi".to_owned(),
            Value::String(OPENAPI_VERSION.to_owned()),
        );
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn document_pins_version_and_title() {
        let document = openapi_document().expect("serialises");
        assert_eq!(document["openapi"], "3.0.0");
        assert_eq!(document["info"]["title"], "Carbon Footprint API");
        assert_eq!(document["info"]["version"], "1.0.0");
        assert_eq!(document["servers"][0]["url"], "http://localhost:3000");
    }

    #[rstest]
    fn basic_auth_scheme_is_registered() {
        let document = openapi_document().expect("serialises");
        let scheme = &document["components"]["securitySchemes"][BASIC_AUTH_SCHEME];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "basic");
    }

    #[rstest]
    fn basic_auth_applies_globally() {
        let document = openapi_document().expect("serialises");
        assert!(document["security"][0].get(BASIC_AUTH_SCHEME).is_some());
    }

    #[rstest]
    #[case("/estimate")]
    #[case("/upload")]
    fn estimation_paths_require_basic_auth(#[case] path: &str) {
        let document = openapi_document().expect("serialises");
        let security = &document["paths"][path]["post"]["security"];
        assert!(
            security[0].get(BASIC_AUTH_SCHEME).is_some(),
            "{path} should require {BASIC_AUTH_SCHEME}: {security}"
        );
    }

    fn type_arrays(value: &Value, found: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::Array(types)) = map.get("type") {
                    found.push(format!("{types:?}"));
                }
                map.values().for_each(|child| type_arrays(child, found));
            }
            Value::Array(items) => items.iter().for_each(|child| type_arrays(child, found)),
            _ => {}
        }
    }

    #[rstest]
    fn document_has_no_openapi_3_1_type_arrays() {
        let document = openapi_document().expect("serialises");
        let mut found = Vec::new();
        type_arrays(&document, &mut found);
        assert!(found.is_empty(), "3.1 type arrays in a 3.0 document: {found:?}");
    }

    #[rstest]
    fn wire_schemas_are_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_object_schema_has_field(
            schemas.get("CarbonEstimate").expect("CarbonEstimate"),
            "estimated_carbon_kg",
        );
        assert_object_schema_has_field(schemas.get("Ingredient").expect("Ingredient"), "carbon_kg");
        assert_object_schema_has_field(
            schemas.get("ErrorResponse").expect("ErrorResponse"),
            "message",
        );
    }
}
