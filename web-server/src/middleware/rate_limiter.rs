// web-server/src/middleware/rate_limiter.rs
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpResponse, ResponseError,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;

// Defaults for abuse-prone endpoints (contact form, login flow)
const DEFAULT_MAX_REQUESTS: usize = 5;
const DEFAULT_WINDOW_SECONDS: u64 = 60;

// Custom error for rate limiting
#[derive(Debug)]
struct RateLimitExceeded {
    retry_after: u64,
}

impl fmt::Display for RateLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rate limit exceeded")
    }
}

impl ResponseError for RateLimitExceeded {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::TooManyRequests()
            .append_header((header::RETRY_AFTER, self.retry_after.to_string()))
            .json(json!({ "error": "Too many requests. Please try again later." }))
    }
}

// Store for rate limit data
#[derive(Debug, Clone)]
pub struct RateLimiter {
    paths: Vec<String>,
    max_requests: usize,
    window: Duration,
    store: Arc<Mutex<HashMap<String, (Vec<Instant>, Instant)>>>,
}

impl RateLimiter {
    pub fn new(paths: Vec<String>) -> Self {
        Self::with_limits(paths, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS)
    }

    pub fn with_limits(paths: Vec<String>, max_requests: usize, window_seconds: u64) -> Self {
        Self {
            paths,
            max_requests,
            window: Duration::from_secs(window_seconds),
            store: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn is_rate_limited(&self, ip: &str) -> bool {
        let mut store = match self.store.lock() {
            Ok(guard) => guard,
            // A poisoned store fails open rather than blocking all traffic
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();

        let entry = store.entry(ip.to_string()).or_insert_with(|| (Vec::new(), now));

        if now.duration_since(entry.1) > self.window {
            entry.0.retain(|time| now.duration_since(*time) < self.window);
            entry.1 = now;
        }

        if entry.0.len() >= self.max_requests {
            true
        } else {
            entry.0.push(now);
            false
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Check if this path should be rate limited
        let path = req.path().to_string();
        let should_rate_limit = self.limiter.paths.iter().any(|p| path.starts_with(p));

        if should_rate_limit {
            // Get client IP
            let ip = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();

            // Check if rate limited
            if self.limiter.is_rate_limited(&ip) {
                tracing::warn!("Rate limit exceeded for IP: {}", ip);

                let retry_after = self.limiter.window.as_secs();
                return Box::pin(async move { Err(RateLimitExceeded { retry_after }.into()) });
            }
        }

        // Continue with the regular service
        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
