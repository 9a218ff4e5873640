//! Cross-origin resource sharing.

use actix_cors::Cors;

/// Build the CORS middleware.
///
/// Any origin, method and request header is allowed, and every response
/// header is exposed so browsers can read `trace-id` and the rate limit
/// counters. Preflight requests are answered here without reaching a
/// handler.
#[must_use]
pub fn cross_origin() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .expose_any_header()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    const WEB_ORIGIN: &str = "https://meals.example";

    #[rstest]
    #[actix_web::test]
    async fn preflights_are_answered_for_any_origin() {
        let app = actix_test::init_service(
            App::new()
                .wrap(cross_origin())
                .route("/estimate", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/estimate")
            .insert_header((ORIGIN, WEB_ORIGIN))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "authorization,content-type"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some(WEB_ORIGIN)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn simple_requests_echo_the_origin() {
        let app = actix_test::init_service(
            App::new()
                .wrap(cross_origin())
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((ORIGIN, WEB_ORIGIN))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(
            res.headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some(WEB_ORIGIN)
        );
    }
}
