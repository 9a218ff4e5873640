//! Interactive documentation: the raw OpenAPI document and Swagger UI.

use actix_web::{HttpResponse, get};
use utoipa_swagger_ui::{Config, SwaggerUi};

use crate::doc::openapi_document;
use crate::domain::Error;

use super::ApiResult;

/// Path serving the OpenAPI document.
pub const OPENAPI_JSON_PATH: &str = "/api-docs.json";

/// OpenAPI document as JSON.
///
/// # Errors
/// An internal error if the document cannot be serialised.
#[get("/api-docs.json")]
pub async fn openapi_json() -> ApiResult<HttpResponse> {
    let document = openapi_document()
        .map_err(|err| Error::internal("failed to render OpenAPI document").with_source(err))?;
    Ok(HttpResponse::Ok().json(document))
}

/// Swagger UI under `/api-docs/`, reading [`OPENAPI_JSON_PATH`].
#[must_use]
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/api-docs/{_:.*}").config(Config::new([OPENAPI_JSON_PATH]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn serves_the_pinned_document() {
        let app = actix_test::init_service(App::new().service(openapi_json)).await;
        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get().uri(OPENAPI_JSON_PATH).to_request(),
        )
        .await;
        assert_eq!(body["openapi"], "3.0.0");
        assert_eq!(body["info"]["title"], "Carbon Footprint API");
    }

    #[rstest]
    #[actix_web::test]
    async fn swagger_ui_serves_its_index() {
        let app = actix_test::init_service(App::new().service(swagger_ui())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api-docs/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Swagger UI"), "unexpected page: {html}");
    }
}
