// web-server/src/api/admin.rs
use std::sync::Arc;

use actix_web::{error, web, HttpMessage, HttpRequest, HttpResponse, Responder, Scope};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use common::models::contact::{ContactSubmission, SubmissionStatus};
use common::models::game::Game;
use common::models::job::{Job, JobStatus};
use common::models::news::{ArticleStatus, NewsArticle};
use common::models::page::Page;
use common::models::session::AdminIdentity;
use common::models::settings::SiteSettings;
use common::models::user::{AdminUser, Permission, Role};

use crate::client::resource::{RemoveOutcome, Resource};
use crate::client::workspace::{AdminWorkspace, WorkspaceRegistry, WorkspaceSlot};
use crate::middleware::auth_gate::SessionKey;

/// Pull the verified identity and session workspace out of a gated request
fn session_workspace(
    req: &HttpRequest,
    registry: &WorkspaceRegistry,
) -> Result<(AdminIdentity, Arc<AdminWorkspace>), actix_web::Error> {
    let extensions = req.extensions();
    let identity = extensions.get::<AdminIdentity>().cloned();
    let key = extensions.get::<SessionKey>().cloned();
    drop(extensions);

    match (identity, key) {
        (Some(identity), Some(SessionKey(token))) => {
            let workspace = registry.obtain(&token, &identity.username);
            Ok((identity, workspace))
        }
        _ => Err(error::ErrorUnauthorized(
            json!({ "error": "authentication required" }),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub confirm: Option<bool>,
}

// Generic CRUD handlers over the session workspace clients

async fn list_resource<T>(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
) -> Result<HttpResponse, actix_web::Error>
where
    T: Resource,
    AdminWorkspace: WorkspaceSlot<T>,
{
    let (_, workspace) = session_workspace(&req, &registry)?;
    let client = WorkspaceSlot::<T>::client(workspace.as_ref());
    client.ensure_loaded().await?;

    let items = client.snapshot();
    Ok(HttpResponse::Ok().json(json!({ "total": items.len(), "items": items })))
}

async fn create_resource<T>(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    draft: web::Json<Value>,
) -> Result<HttpResponse, actix_web::Error>
where
    T: Resource,
    AdminWorkspace: WorkspaceSlot<T>,
{
    let (identity, workspace) = session_workspace(&req, &registry)?;
    let client = WorkspaceSlot::<T>::client(workspace.as_ref());

    let created = client.create(draft.into_inner()).await?;
    tracing::info!("{} created a {} record", identity.username, T::label());
    Ok(HttpResponse::Created().json(created))
}

async fn read_resource<T>(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    key: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error>
where
    T: Resource,
    AdminWorkspace: WorkspaceSlot<T>,
{
    let (_, workspace) = session_workspace(&req, &registry)?;
    let client = WorkspaceSlot::<T>::client(workspace.as_ref());
    client.ensure_loaded().await?;

    match client.find(&key) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(crate::error::ClientError::NotFound(format!(
            "{}/{}",
            T::label(),
            key
        ))
        .into()),
    }
}

async fn update_resource<T>(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    key: web::Path<String>,
    patch: web::Json<Value>,
) -> Result<HttpResponse, actix_web::Error>
where
    T: Resource,
    AdminWorkspace: WorkspaceSlot<T>,
{
    let (identity, workspace) = session_workspace(&req, &registry)?;
    let client = WorkspaceSlot::<T>::client(workspace.as_ref());

    let updated = client.update(&key, patch.into_inner()).await?;
    tracing::info!("{} updated {}/{}", identity.username, T::label(), key);
    Ok(HttpResponse::Ok().json(updated))
}

async fn delete_resource<T>(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    key: web::Path<String>,
    query: web::Query<ConfirmQuery>,
) -> Result<HttpResponse, actix_web::Error>
where
    T: Resource,
    AdminWorkspace: WorkspaceSlot<T>,
{
    let (identity, workspace) = session_workspace(&req, &registry)?;
    let client = WorkspaceSlot::<T>::client(workspace.as_ref());

    let confirmed = query.confirm.unwrap_or(false);
    match client.remove(&key, confirmed).await? {
        RemoveOutcome::Removed => {
            tracing::info!("{} deleted {}/{}", identity.username, T::label(), key);
            Ok(HttpResponse::Ok().json(json!({ "status": "deleted" })))
        }
        RemoveOutcome::Declined => Ok(HttpResponse::Ok().json(json!({ "status": "declined" }))),
    }
}

fn resource_routes<T>(path: &str) -> Scope
where
    T: Resource,
    AdminWorkspace: WorkspaceSlot<T>,
{
    web::scope(path)
        .route("", web::get().to(list_resource::<T>))
        .route("", web::post().to(create_resource::<T>))
        .route("/{key}", web::get().to(read_resource::<T>))
        .route("/{key}", web::put().to(update_resource::<T>))
        .route("/{key}", web::delete().to(delete_resource::<T>))
}

// Contact submissions get bespoke read/reply flows: opening one marks it
// read, replying marks it replied.

async fn read_contact(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    key: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let (_, workspace) = session_workspace(&req, &registry)?;
    workspace.contact.ensure_loaded().await?;

    let submission = workspace.contact.find(&key).ok_or_else(|| {
        crate::error::ClientError::NotFound(format!("contact/{}", key))
    })?;

    if submission.status == SubmissionStatus::New {
        let updated = workspace
            .contact
            .update(&key, json!({ "status": "read" }))
            .await?;
        return Ok(HttpResponse::Ok().json(updated));
    }

    Ok(HttpResponse::Ok().json(submission))
}

async fn reply_contact(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    key: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let (identity, workspace) = session_workspace(&req, &registry)?;
    workspace.contact.ensure_loaded().await?;

    let updated = workspace
        .contact
        .update(&key, json!({ "status": "replied" }))
        .await?;
    tracing::info!("{} replied to contact/{}", identity.username, key);
    Ok(HttpResponse::Ok().json(updated))
}

// Settings singleton

async fn read_settings(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
) -> Result<HttpResponse, actix_web::Error> {
    let (_, workspace) = session_workspace(&req, &registry)?;
    let settings = workspace.settings.ensure_loaded().await?;
    Ok(HttpResponse::Ok().json(settings))
}

async fn save_settings(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
    body: web::Json<SiteSettings>,
) -> Result<HttpResponse, actix_web::Error> {
    let (identity, workspace) = session_workspace(&req, &registry)?;
    let saved = workspace.settings.save(body.into_inner()).await?;
    tracing::info!("{} saved site settings", identity.username);
    Ok(HttpResponse::Ok().json(saved))
}

// Shell metadata endpoints

async fn me(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
) -> Result<HttpResponse, actix_web::Error> {
    let (identity, _) = session_workspace(&req, &registry)?;
    Ok(HttpResponse::Ok().json(identity))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NavSection {
    label: &'static str,
    path: &'static str,
    permission: Permission,
}

async fn nav() -> impl Responder {
    let sections = [
        NavSection { label: "Games", path: "/admin/games", permission: Permission::ManageGames },
        NavSection { label: "News", path: "/admin/news", permission: Permission::ManageNews },
        NavSection { label: "Jobs", path: "/admin/jobs", permission: Permission::ManageJobs },
        NavSection { label: "Pages", path: "/admin/pages", permission: Permission::ManagePages },
        NavSection {
            label: "Inbox",
            path: "/admin/contact",
            permission: Permission::ViewContactSubmissions,
        },
        NavSection { label: "Users", path: "/admin/users", permission: Permission::ManageUsers },
        NavSection { label: "Roles", path: "/admin/roles", permission: Permission::ManageRoles },
        NavSection {
            label: "Settings",
            path: "/admin/settings",
            permission: Permission::ManageSettings,
        },
    ];
    HttpResponse::Ok().json(json!({ "sections": sections }))
}

async fn dashboard(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
) -> Result<HttpResponse, actix_web::Error> {
    let (_, workspace) = session_workspace(&req, &registry)?;

    workspace.games.ensure_loaded().await?;
    workspace.news.ensure_loaded().await?;
    workspace.jobs.ensure_loaded().await?;
    workspace.contact.ensure_loaded().await?;

    let summary = json!({
        "games": {
            "total": workspace.games.snapshot().len(),
            "featured": workspace.games.count_where(|g: &Game| g.is_featured),
        },
        "news": {
            "published": workspace
                .news
                .count_where(|a: &NewsArticle| a.status == ArticleStatus::Published),
            "drafts": workspace
                .news
                .count_where(|a: &NewsArticle| a.status == ArticleStatus::Draft),
        },
        "jobs": {
            "active": workspace.jobs.count_where(|j: &Job| j.status == JobStatus::Active),
        },
        "contact": {
            "unread": workspace
                .contact
                .count_where(|c: &ContactSubmission| c.status == SubmissionStatus::New),
        },
    });

    Ok(HttpResponse::Ok().json(summary))
}

// Admin shell pages. The frontend bundle owns the real UI; these pages
// are the minimal HTML entry points it boots from.

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn shell_page(req: HttpRequest) -> impl Responder {
    let username = req
        .extensions()
        .get::<AdminIdentity>()
        .map(|i| i.username.clone())
        .unwrap_or_default();

    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Emberhollow Admin</title>\n</head>\n<body>\n\
         <div id=\"admin-root\" data-username=\"{}\"></div>\n\
         <script src=\"/admin-assets/admin.js\"></script>\n</body>\n</html>",
        html_escape(&username)
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

async fn login_page(query: web::Query<LoginPageQuery>) -> impl Responder {
    use common::models::session::LoginError;

    let notice = query
        .error
        .as_deref()
        .and_then(LoginError::from_code)
        .map(|e| format!("<p class=\"login-error\">{}</p>", e.message()))
        .unwrap_or_default();

    let body = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Emberhollow Admin — Sign in</title>\n</head>\n<body>\n\
         <main class=\"login\">\n<h1>Emberhollow Studios</h1>\n{}\
         <a class=\"discord-login\" href=\"/auth/discord\">Sign in with Discord</a>\n\
         </main>\n</body>\n</html>",
        notice
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("", web::get().to(shell_page))
            .route("/login", web::get().to(login_page))
            .default_service(web::get().to(shell_page)),
    )
    .service(
        web::scope("/api/admin")
            .route("/me", web::get().to(me))
            .route("/nav", web::get().to(nav))
            .route("/dashboard", web::get().to(dashboard))
            .route("/settings", web::get().to(read_settings))
            .route("/settings", web::put().to(save_settings))
            .service(resource_routes::<Game>("/games"))
            .service(resource_routes::<NewsArticle>("/news"))
            .service(resource_routes::<Job>("/jobs"))
            .service(resource_routes::<AdminUser>("/users"))
            .service(resource_routes::<Role>("/roles"))
            .service(resource_routes::<Page>("/pages"))
            .service(
                web::scope("/contact")
                    .route("", web::get().to(list_resource::<ContactSubmission>))
                    .route("/{key}", web::get().to(read_contact))
                    .route("/{key}/reply", web::post().to(reply_contact))
                    .route(
                        "/{key}",
                        web::delete().to(delete_resource::<ContactSubmission>),
                    ),
            ),
    );
}
