//! Security headers middleware
//!
//! Adds security headers to all responses to protect against common web
//! vulnerabilities.

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Middleware that adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert(
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains".parse().unwrap(),
    );
    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "SAMEORIGIN".parse().unwrap());
    headers.insert(
        "Referrer-Policy",
        "strict-origin-when-cross-origin".parse().unwrap(),
    );
    // API-only service: deny everything content-wise
    headers.insert(
        "Content-Security-Policy",
        "default-src 'none'; frame-ancestors 'none'".parse().unwrap(),
    );
    headers.insert(
        "Cache-Control",
        "no-store, no-cache, must-revalidate, private".parse().unwrap(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    #[tokio::test]
    async fn test_security_headers_are_added() {
        let app = Router::new()
            .route("/test", get(test_handler))
            .layer(axum::middleware::from_fn(security_headers_middleware));

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert!(response.headers().contains_key("strict-transport-security"));
        assert!(response.headers().contains_key("x-content-type-options"));
        assert!(response.headers().contains_key("cache-control"));
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }
}
