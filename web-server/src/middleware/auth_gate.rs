// web-server/src/middleware/auth_gate.rs
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;

use common::models::session::{AdminIdentity, SESSION_COOKIE_NAME};
use common::verify_session_token;

use crate::api::auth::expired_session_cookie;

pub const LOGIN_PATH: &str = "/admin/login";

const PROTECTED_PREFIXES: [&str; 2] = ["/admin", "/api/admin"];

/// Raw session token of the request's verified identity, stored in request
/// extensions for handlers that key per-session state off it.
#[derive(Debug, Clone)]
pub struct SessionKey(pub String);

/// Outcome of classifying the session cookie on a protected request
#[derive(Debug)]
enum SessionState {
    NoToken,
    InvalidToken,
    ValidNonAdmin,
    ValidAdmin(AdminIdentity),
}

fn classify(cookie_value: Option<&str>, secret: &[u8]) -> SessionState {
    let token = match cookie_value {
        Some(t) if !t.is_empty() => t,
        _ => return SessionState::NoToken,
    };

    match verify_session_token(token, secret) {
        Ok(identity) if identity.is_admin => SessionState::ValidAdmin(identity),
        Ok(_) => SessionState::ValidNonAdmin,
        Err(_) => SessionState::InvalidToken,
    }
}

fn requires_session(path: &str) -> bool {
    // The login page and the OAuth flow must stay reachable without a session
    if path == LOGIN_PATH || path.starts_with("/auth/") {
        return false;
    }

    PROTECTED_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .map(|rest| rest.starts_with('/'))
                .unwrap_or(false)
    })
}

/// Session gate over the admin surface. Verifies the session cookie on
/// protected paths and rejects everything that is not a valid admin session.
#[derive(Clone)]
pub struct AuthGate {
    secret: Arc<Vec<u8>>,
}

impl AuthGate {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: Arc::new(secret.to_vec()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: S,
    secret: Arc<Vec<u8>>,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();

        if !requires_session(&path) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let cookie = req.cookie(SESSION_COOKIE_NAME);
        let state = classify(cookie.as_ref().map(|c| c.value()), &self.secret);

        match state {
            SessionState::ValidAdmin(identity) => {
                if let Some(cookie) = cookie {
                    req.extensions_mut().insert(SessionKey(cookie.value().to_string()));
                }
                req.extensions_mut().insert(identity);

                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            state => {
                tracing::debug!("Rejecting {} with session state {:?}", path, state);

                // Any cookie that failed the gate is cleared, including a
                // valid token without the admin flag
                let had_cookie = cookie.is_some();

                // API callers get a status, page loads get sent to the login page
                let response = if path.starts_with("/api/") {
                    let mut builder = HttpResponse::Unauthorized();
                    if had_cookie {
                        builder.cookie(expired_session_cookie());
                    }
                    builder.json(json!({ "error": "authentication required" }))
                } else {
                    let mut builder = HttpResponse::Found();
                    builder.append_header((header::LOCATION, LOGIN_PATH));
                    if had_cookie {
                        builder.cookie(expired_session_cookie());
                    }
                    builder.finish()
                };

                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpRequest, HttpResponse};
    use common::issue_session_token;

    const SECRET: &[u8] = b"gate_test_secret";

    fn gated_app() -> App<
        impl actix_web::dev::ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<EitherBody<actix_web::body::BoxBody>>,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(AuthGate::new(SECRET))
            .route(
                "/admin",
                web::get().to(|req: HttpRequest| async move {
                    let identity = req
                        .extensions()
                        .get::<AdminIdentity>()
                        .cloned()
                        .map(|i| i.username)
                        .unwrap_or_default();
                    HttpResponse::Ok().body(identity)
                }),
            )
            .route("/admin/login", web::get().to(HttpResponse::Ok))
            .route("/api/admin/games", web::get().to(HttpResponse::Ok))
            .route("/auth/dev-login", web::get().to(HttpResponse::Ok))
            .route("/", web::get().to(HttpResponse::Ok))
    }

    fn session_cookie(token: &str) -> actix_web::cookie::Cookie<'static> {
        actix_web::cookie::Cookie::new(SESSION_COOKIE_NAME, token.to_string())
    }

    #[actix_web::test]
    async fn public_paths_pass_without_a_session() {
        let app = test::init_service(gated_app()).await;

        for uri in ["/", "/admin/login", "/auth/dev-login"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success(), "{} should be open", uri);
        }
    }

    #[actix_web::test]
    async fn missing_session_redirects_pages_to_login() {
        let app = test::init_service(gated_app()).await;

        let req = test::TestRequest::get().uri("/admin").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
        // No cookie was presented, so none is cleared
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    #[actix_web::test]
    async fn missing_session_gets_401_on_api_paths() {
        let app = test::init_service(gated_app()).await;

        let req = test::TestRequest::get().uri("/api/admin/games").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbage_cookie_is_cleared_and_redirected() {
        let app = test::init_service(gated_app()).await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .cookie(session_cookie("not-a-real-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE_NAME)));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[actix_web::test]
    async fn valid_non_admin_session_is_rejected_and_cleared() {
        let app = test::init_service(gated_app()).await;

        let token = issue_session_token("visitor", false, 3600, SECRET).unwrap();
        let req = test::TestRequest::get()
            .uri("/admin")
            .cookie(session_cookie(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND);
        assert!(resp.headers().get(header::SET_COOKIE).is_some());
    }

    #[actix_web::test]
    async fn valid_admin_session_reaches_the_handler_with_identity() {
        let app = test::init_service(gated_app()).await;

        let token = issue_session_token("mira", true, 3600, SECRET).unwrap();
        let req = test::TestRequest::get()
            .uri("/admin")
            .cookie(session_cookie(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert_eq!(body, "mira");
    }

    #[actix_web::test]
    async fn expired_admin_session_is_rejected() {
        let app = test::init_service(gated_app()).await;

        let token = issue_session_token("mira", true, -100, SECRET).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/admin/games")
            .cookie(session_cookie(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn prefix_matching_does_not_leak_onto_sibling_paths() {
        assert!(requires_session("/admin"));
        assert!(requires_session("/admin/games"));
        assert!(requires_session("/api/admin"));
        assert!(requires_session("/api/admin/news"));

        assert!(!requires_session("/administrator"));
        assert!(!requires_session("/api/administrative"));
        assert!(!requires_session("/admin/login"));
        assert!(!requires_session("/auth/discord/callback"));
        assert!(!requires_session("/api/games"));
        assert!(!requires_session("/"));
    }
}
