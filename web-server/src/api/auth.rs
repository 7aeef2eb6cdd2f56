// web-server/src/api/auth.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::{
    cookie::{Cookie, SameSite},
    get, post, web, HttpRequest, HttpResponse, Responder,
};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use common::models::session::{LoginError, SESSION_COOKIE_NAME};
use common::{issue_session_token, Config};

use crate::client::workspace::WorkspaceRegistry;
use crate::middleware::auth_gate::LOGIN_PATH;
use crate::utils::token::generate_state_token;

const DISCORD_AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_USER_URL: &str = "https://discord.com/api/users/@me";
const DISCORD_GUILDS_URL: &str = "https://discord.com/api/users/@me/guilds";

// Short-lived cookie carrying the OAuth state nonce across the round trip
const STATE_COOKIE_NAME: &str = "emberhollow_oauth_state";
const STATE_COOKIE_MAX_AGE: i64 = 600;

/// Build the session cookie for a freshly issued token
fn session_cookie<'a>(token: String, config: &Config) -> Cookie<'a> {
    Cookie::build(SESSION_COOKIE_NAME, token)
        .path("/")
        .secure(config.session.cookie_secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(config.session.ttl_hours * 3600))
        .finish()
}

/// Cookie that clears the session on the client
pub(crate) fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}

fn state_cookie<'a>(state: String) -> Cookie<'a> {
    Cookie::build(STATE_COOKIE_NAME, state)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(STATE_COOKIE_MAX_AGE))
        .finish()
}

fn expired_state_cookie() -> Cookie<'static> {
    Cookie::build(STATE_COOKIE_NAME, "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}

fn login_error_redirect(error: LoginError) -> HttpResponse {
    HttpResponse::Found()
        .append_header((
            actix_web::http::header::LOCATION,
            format!("{}?error={}", LOGIN_PATH, error.code()),
        ))
        .cookie(expired_state_cookie())
        .finish()
}

// Begin the Discord OAuth flow
#[get("/discord")]
pub async fn discord_login(config: web::Data<Config>) -> impl Responder {
    if config.discord.client_id.is_empty() || config.discord.redirect_uri.is_empty() {
        tracing::error!("Discord OAuth is not configured");
        return login_error_redirect(LoginError::ConfigError);
    }

    let state = generate_state_token();

    let url = match Url::parse_with_params(
        DISCORD_AUTHORIZE_URL,
        &[
            ("client_id", config.discord.client_id.as_str()),
            ("redirect_uri", config.discord.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "identify guilds"),
            ("state", state.as_str()),
        ],
    ) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Could not build Discord authorize URL: {}", e);
            return login_error_redirect(LoginError::ConfigError);
        }
    };

    HttpResponse::Found()
        .append_header((actix_web::http::header::LOCATION, url.to_string()))
        .cookie(state_cookie(state))
        .finish()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct DiscordGuild {
    id: String,
}

// Complete the Discord OAuth flow: exchange the code, check studio
// membership, issue the session cookie
#[get("/discord/callback")]
pub async fn discord_callback(
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
    config: web::Data<Config>,
) -> impl Responder {
    if config.discord.client_id.is_empty() || config.discord.client_secret.is_empty() {
        return login_error_redirect(LoginError::ConfigError);
    }

    if let Some(error) = &query.error {
        tracing::info!("Discord sign-in denied: {}", error);
        return login_error_redirect(LoginError::OauthDenied);
    }

    let code = match &query.code {
        Some(code) if !code.is_empty() => code.clone(),
        _ => return login_error_redirect(LoginError::NoCode),
    };

    // The state nonce must match the one set on the way out
    let cookie_state = req.cookie(STATE_COOKIE_NAME).map(|c| c.value().to_string());
    match (&query.state, cookie_state) {
        (Some(returned), Some(expected)) if *returned == expected => {}
        _ => {
            tracing::warn!("OAuth state mismatch on Discord callback");
            return login_error_redirect(LoginError::AuthFailed);
        }
    }

    let http = reqwest::Client::new();

    // Exchange the authorization code for an access token
    let token_response = http
        .post(DISCORD_TOKEN_URL)
        .form(&[
            ("client_id", config.discord.client_id.as_str()),
            ("client_secret", config.discord.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", config.discord.redirect_uri.as_str()),
        ])
        .send()
        .await;

    let access_token = match token_response {
        Ok(response) if response.status().is_success() => {
            match response.json::<TokenResponse>().await {
                Ok(token) => token.access_token,
                Err(e) => {
                    tracing::warn!("Could not decode Discord token response: {}", e);
                    return login_error_redirect(LoginError::TokenFailed);
                }
            }
        }
        Ok(response) => {
            tracing::warn!("Discord token exchange returned {}", response.status());
            return login_error_redirect(LoginError::TokenFailed);
        }
        Err(e) => {
            tracing::warn!("Discord token exchange failed: {}", e);
            return login_error_redirect(LoginError::TokenFailed);
        }
    };

    // Fetch the Discord profile
    let user = match http
        .get(DISCORD_USER_URL)
        .bearer_auth(&access_token)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            match response.json::<DiscordUser>().await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("Could not decode Discord user: {}", e);
                    return login_error_redirect(LoginError::UserFailed);
                }
            }
        }
        Ok(response) => {
            tracing::warn!("Discord user fetch returned {}", response.status());
            return login_error_redirect(LoginError::UserFailed);
        }
        Err(e) => {
            tracing::warn!("Discord user fetch failed: {}", e);
            return login_error_redirect(LoginError::UserFailed);
        }
    };

    // Membership in the studio guild is what grants admin access
    let guilds = match http
        .get(DISCORD_GUILDS_URL)
        .bearer_auth(&access_token)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            match response.json::<Vec<DiscordGuild>>().await {
                Ok(guilds) => guilds,
                Err(e) => {
                    tracing::warn!("Could not decode Discord guilds: {}", e);
                    return login_error_redirect(LoginError::UserFailed);
                }
            }
        }
        Ok(response) => {
            tracing::warn!("Discord guilds fetch returned {}", response.status());
            return login_error_redirect(LoginError::UserFailed);
        }
        Err(e) => {
            tracing::warn!("Discord guilds fetch failed: {}", e);
            return login_error_redirect(LoginError::UserFailed);
        }
    };

    let is_member = guilds.iter().any(|g| g.id == config.discord.guild_id);
    if !is_member {
        tracing::info!("Discord user {} is not a studio member", user.username);
        return login_error_redirect(LoginError::NotMember);
    }

    let ttl_seconds = config.session.ttl_hours * 3600;
    let token = match issue_session_token(
        &user.username,
        true,
        ttl_seconds,
        config.session.secret.as_bytes(),
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Could not issue session token for {}: {}", user.id, e);
            return login_error_redirect(LoginError::CallbackFailed);
        }
    };

    tracing::info!("Discord sign-in completed for {}", user.username);

    HttpResponse::Found()
        .append_header((actix_web::http::header::LOCATION, "/admin"))
        .cookie(session_cookie(token, &config))
        .cookie(expired_state_cookie())
        .finish()
}

// End the session: drop the workspace and clear the cookie
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    registry: web::Data<WorkspaceRegistry>,
) -> impl Responder {
    if let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) {
        registry.invalidate(cookie.value());
    }

    HttpResponse::Found()
        .append_header((actix_web::http::header::LOCATION, LOGIN_PATH))
        .cookie(expired_session_cookie())
        .finish()
}

#[derive(Debug, Deserialize)]
pub struct DevLoginRequest {
    pub username: String,
}

// Local development bypass for the OAuth flow. Disabled unless the
// configuration explicitly enables it; hidden entirely when disabled.
#[post("/dev-login")]
pub async fn dev_login(
    body: web::Json<DevLoginRequest>,
    config: web::Data<Config>,
) -> impl Responder {
    if !config.auth.dev_login_enabled {
        return HttpResponse::NotFound().finish();
    }

    let username = body.username.trim();
    if username.is_empty() {
        return HttpResponse::UnprocessableEntity()
            .json(json!({ "error": "username is required" }));
    }

    let ttl_seconds = config.session.ttl_hours * 3600;
    let token = match issue_session_token(
        username,
        true,
        ttl_seconds,
        config.session.secret.as_bytes(),
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Could not issue dev session token: {}", e);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "could not issue session" }));
        }
    };

    tracing::info!("Dev login issued for {}", username);

    HttpResponse::Ok()
        .cookie(session_cookie(token, &config))
        .json(json!({ "status": "ok", "username": username }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(discord_login)
            .service(discord_callback)
            .service(logout)
            .service(dev_login),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::workspace::WorkspaceRegistry;
    use crate::test_support::MockTransport;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use common::verify_session_token;
    use std::sync::Arc;

    fn test_config(dev_login_enabled: bool) -> Config {
        let mut config = Config::default();
        config.auth.dev_login_enabled = dev_login_enabled;
        config.discord.client_id = "client-id".to_string();
        config.discord.client_secret = "client-secret".to_string();
        config.discord.redirect_uri = "http://localhost:8081/auth/discord/callback".to_string();
        config.discord.guild_id = "guild-1".to_string();
        config
    }

    async fn call(
        config: Config,
        req: test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let registry = web::Data::new(WorkspaceRegistry::new(Arc::new(MockTransport::new())));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(registry)
                .configure(configure),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn dev_login_is_hidden_when_disabled() {
        let resp = call(
            test_config(false),
            test::TestRequest::post()
                .uri("/auth/dev-login")
                .set_json(json!({ "username": "mira" })),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn dev_login_issues_a_verifiable_admin_session() {
        let config = test_config(true);
        let secret = config.session.secret.clone();

        let resp = call(
            config,
            test::TestRequest::post()
                .uri("/auth/dev-login")
                .set_json(json!({ "username": "mira" })),
        )
        .await;

        assert!(resp.status().is_success());
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        let token = set_cookie
            .trim_start_matches(&format!("{}=", SESSION_COOKIE_NAME))
            .split(';')
            .next()
            .unwrap();

        let identity = verify_session_token(token, secret.as_bytes()).unwrap();
        assert_eq!(identity.username, "mira");
        assert!(identity.is_admin);
    }

    #[actix_web::test]
    async fn dev_login_rejects_a_blank_username() {
        let resp = call(
            test_config(true),
            test::TestRequest::post()
                .uri("/auth/dev-login")
                .set_json(json!({ "username": "   " })),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn discord_login_redirects_to_the_authorize_url_with_state() {
        let resp = call(test_config(true), test::TestRequest::get().uri("/auth/discord")).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(location.starts_with(DISCORD_AUTHORIZE_URL));
        assert!(location.contains("client_id=client-id"));
        assert!(location.contains("state="));

        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.starts_with(STATE_COOKIE_NAME));
    }

    #[actix_web::test]
    async fn discord_login_without_configuration_reports_config_error() {
        let mut config = test_config(true);
        config.discord.client_id = String::new();

        let resp = call(config, test::TestRequest::get().uri("/auth/discord")).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(location, "/admin/login?error=config_error");
    }

    #[actix_web::test]
    async fn callback_with_an_oauth_error_reports_denied() {
        let resp = call(
            test_config(true),
            test::TestRequest::get().uri("/auth/discord/callback?error=access_denied"),
        )
        .await;

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(location, "/admin/login?error=oauth_denied");
    }

    #[actix_web::test]
    async fn callback_without_a_code_reports_no_code() {
        let resp = call(
            test_config(true),
            test::TestRequest::get().uri("/auth/discord/callback"),
        )
        .await;

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(location, "/admin/login?error=no_code");
    }

    #[actix_web::test]
    async fn callback_with_a_state_mismatch_reports_auth_failed() {
        let resp = call(
            test_config(true),
            test::TestRequest::get()
                .uri("/auth/discord/callback?code=abc&state=returned")
                .cookie(actix_web::cookie::Cookie::new(STATE_COOKIE_NAME, "expected")),
        )
        .await;

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(location, "/admin/login?error=auth_failed");
    }

    #[actix_web::test]
    async fn logout_clears_the_cookie_and_redirects_to_login() {
        let resp = call(
            test_config(true),
            test::TestRequest::post()
                .uri("/auth/logout")
                .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE_NAME, "anything")),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap(),
            LOGIN_PATH
        );
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
