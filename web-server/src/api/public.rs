// web-server/src/api/public.rs
use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use common::models::game::Game;
use common::models::job::Job;
use common::models::news::NewsArticle;

use crate::client::transport::{Method, Transport};

/// Stateless pass-through to the content API for the marketing site.
/// Nothing is cached: a failed upstream call surfaces as a failure
/// instead of stale content.
pub struct PublicGateway {
    transport: Arc<dyn Transport>,
}

impl PublicGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

fn upstream_failed() -> HttpResponse {
    HttpResponse::BadGateway().json(json!({ "error": "content service unavailable" }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": "not found" }))
}

#[get("/games")]
pub async fn list_games(gateway: web::Data<PublicGateway>) -> impl Responder {
    let response = match gateway.transport.request(Method::Get, "/api/games", None).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            tracing::warn!("Public games list returned {}", response.status);
            return upstream_failed();
        }
        Err(e) => {
            tracing::warn!("Public games list failed: {}", e);
            return upstream_failed();
        }
    };

    let games: Vec<Game> = match serde_json::from_value(response.body) {
        Ok(games) => games,
        Err(e) => {
            tracing::warn!("Could not decode public games list: {}", e);
            return upstream_failed();
        }
    };

    let visible: Vec<Game> = games.into_iter().filter(Game::is_publicly_visible).collect();
    HttpResponse::Ok().json(json!({ "total": visible.len(), "items": visible }))
}

#[get("/games/{slug}")]
pub async fn get_game(
    gateway: web::Data<PublicGateway>,
    slug: web::Path<String>,
) -> impl Responder {
    let path = format!("/api/games/{}", slug);
    let response = match gateway.transport.request(Method::Get, &path, None).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Public game fetch failed: {}", e);
            return upstream_failed();
        }
    };

    if response.status == 404 {
        return not_found();
    }
    if !response.is_success() {
        tracing::warn!("Public game fetch returned {}", response.status);
        return upstream_failed();
    }

    match serde_json::from_value::<Game>(response.body) {
        // Unannounced games do not exist as far as the public site knows
        Ok(game) if game.is_publicly_visible() => HttpResponse::Ok().json(game),
        Ok(_) => not_found(),
        Err(e) => {
            tracing::warn!("Could not decode public game: {}", e);
            upstream_failed()
        }
    }
}

#[get("/news")]
pub async fn list_news(gateway: web::Data<PublicGateway>) -> impl Responder {
    let response = match gateway.transport.request(Method::Get, "/api/news", None).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            tracing::warn!("Public news list returned {}", response.status);
            return upstream_failed();
        }
        Err(e) => {
            tracing::warn!("Public news list failed: {}", e);
            return upstream_failed();
        }
    };

    let articles: Vec<NewsArticle> = match serde_json::from_value(response.body) {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!("Could not decode public news list: {}", e);
            return upstream_failed();
        }
    };

    let published: Vec<NewsArticle> =
        articles.into_iter().filter(NewsArticle::is_published).collect();
    HttpResponse::Ok().json(json!({ "total": published.len(), "items": published }))
}

#[get("/news/{slug}")]
pub async fn get_news(
    gateway: web::Data<PublicGateway>,
    slug: web::Path<String>,
) -> impl Responder {
    let path = format!("/api/news/{}", slug);
    let response = match gateway.transport.request(Method::Get, &path, None).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Public article fetch failed: {}", e);
            return upstream_failed();
        }
    };

    if response.status == 404 {
        return not_found();
    }
    if !response.is_success() {
        tracing::warn!("Public article fetch returned {}", response.status);
        return upstream_failed();
    }

    match serde_json::from_value::<NewsArticle>(response.body) {
        Ok(article) if article.is_published() => HttpResponse::Ok().json(article),
        Ok(_) => not_found(),
        Err(e) => {
            tracing::warn!("Could not decode public article: {}", e);
            upstream_failed()
        }
    }
}

#[get("/jobs")]
pub async fn list_jobs(gateway: web::Data<PublicGateway>) -> impl Responder {
    let response = match gateway.transport.request(Method::Get, "/api/jobs", None).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            tracing::warn!("Public jobs list returned {}", response.status);
            return upstream_failed();
        }
        Err(e) => {
            tracing::warn!("Public jobs list failed: {}", e);
            return upstream_failed();
        }
    };

    let jobs: Vec<Job> = match serde_json::from_value(response.body) {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::warn!("Could not decode public jobs list: {}", e);
            return upstream_failed();
        }
    };

    let open: Vec<Job> = jobs.into_iter().filter(Job::is_open).collect();
    HttpResponse::Ok().json(json!({ "total": open.len(), "items": open }))
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[post("/contact")]
pub async fn submit_contact(
    gateway: web::Data<PublicGateway>,
    form: web::Json<ContactForm>,
) -> impl Responder {
    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();

    if name.is_empty() || message.is_empty() || !email.contains('@') {
        return HttpResponse::UnprocessableEntity().json(json!({
            "error": "name, email and message are required"
        }));
    }

    let body = json!({
        "name": name,
        "email": email,
        "subject": form.subject.trim(),
        "message": message,
    });

    match gateway
        .transport
        .request(Method::Post, "/api/contact", Some(&body))
        .await
    {
        Ok(response) if response.is_success() => {
            tracing::info!("Forwarded contact submission from {}", email);
            HttpResponse::Created().json(json!({ "status": "received" }))
        }
        Ok(response) => {
            tracing::warn!("Contact forward returned {}", response.status);
            upstream_failed()
        }
        Err(e) => {
            tracing::warn!("Contact forward failed: {}", e);
            upstream_failed()
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(list_games)
            .service(get_game)
            .service(list_news)
            .service(get_news)
            .service(list_jobs)
            .service(submit_contact),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::ApiResponse;
    use crate::test_support::MockTransport;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    async fn call(
        mock: Arc<MockTransport>,
        req: test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let gateway = web::Data::new(PublicGateway::new(mock));
        let app = test::init_service(App::new().app_data(gateway).configure(configure)).await;
        test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn concept_games_are_filtered_from_the_public_list() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse {
            status: 200,
            body: json!([
                { "id": "g1", "slug": "released", "title": "Released", "status": "released" },
                { "id": "g2", "slug": "secret", "title": "Secret", "status": "concept" }
            ]),
        });

        let resp = call(mock, test::TestRequest::get().uri("/api/games")).await;

        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["slug"], "released");
    }

    #[actix_web::test]
    async fn a_concept_game_fetched_directly_is_a_404() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse {
            status: 200,
            body: json!({ "id": "g2", "slug": "secret", "title": "Secret", "status": "concept" }),
        });

        let resp = call(mock, test::TestRequest::get().uri("/api/games/secret")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn upstream_failure_is_a_502_not_stale_content() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_failure("connection refused");

        let resp = call(mock, test::TestRequest::get().uri("/api/games")).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn only_published_news_is_listed() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse {
            status: 200,
            body: json!([
                { "id": "n1", "slug": "live", "title": "Live", "status": "published" },
                { "id": "n2", "slug": "wip", "title": "WIP", "status": "draft" },
                { "id": "n3", "slug": "old", "title": "Old", "status": "archived" }
            ]),
        });

        let resp = call(mock, test::TestRequest::get().uri("/api/news")).await;

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["slug"], "live");
    }

    #[actix_web::test]
    async fn only_active_jobs_are_listed() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse {
            status: 200,
            body: json!([
                { "id": "j1", "title": "Open", "status": "active" },
                { "id": "j2", "title": "Gone", "status": "closed" }
            ]),
        });

        let resp = call(mock, test::TestRequest::get().uri("/api/jobs")).await;

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["title"], "Open");
    }

    #[actix_web::test]
    async fn contact_form_is_validated_before_forwarding() {
        let mock = Arc::new(MockTransport::new());

        let resp = call(
            mock.clone(),
            test::TestRequest::post()
                .uri("/api/contact")
                .set_json(json!({ "name": "Ada", "email": "not-an-email", "message": "Hi" })),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(mock.call_count(), 0);
    }

    #[actix_web::test]
    async fn valid_contact_form_is_forwarded_upstream() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(ApiResponse { status: 201, body: Value::Null });

        let resp = call(
            mock.clone(),
            test::TestRequest::post().uri("/api/contact").set_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Love the game!"
            })),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let call = &mock.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.path, "/api/contact");
        assert_eq!(call.body.as_ref().unwrap()["name"], "Ada");
    }

    #[actix_web::test]
    async fn failed_contact_forward_surfaces_as_502() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_failure("connection refused");

        let resp = call(
            mock,
            test::TestRequest::post().uri("/api/contact").set_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "message": "Hi"
            })),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
