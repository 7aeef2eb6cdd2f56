// web-server/src/client/workspace.rs
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use common::models::contact::ContactSubmission;
use common::models::game::Game;
use common::models::job::Job;
use common::models::news::NewsArticle;
use common::models::page::Page;
use common::models::user::{AdminUser, Role};

use crate::client::resource::{Resource, ResourceClient};
use crate::client::settings::SettingsClient;
use crate::client::transport::Transport;

// Default workspace TTL in seconds (24 hours)
const DEFAULT_WORKSPACE_TTL: i64 = 86400;

/// One admin's working state: a client per managed collection plus the
/// settings singleton. Lives as long as the session that owns it.
pub struct AdminWorkspace {
    pub workspace_id: Uuid,
    pub username: String,
    pub games: ResourceClient<Game>,
    pub news: ResourceClient<NewsArticle>,
    pub jobs: ResourceClient<Job>,
    pub users: ResourceClient<AdminUser>,
    pub roles: ResourceClient<Role>,
    pub pages: ResourceClient<Page>,
    pub contact: ResourceClient<ContactSubmission>,
    pub settings: SettingsClient,
    pub created_at: DateTime<Utc>,
    last_active: Mutex<DateTime<Utc>>,
}

impl AdminWorkspace {
    fn new(username: &str, transport: Arc<dyn Transport>) -> Self {
        let now = Utc::now();
        Self {
            workspace_id: Uuid::new_v4(),
            username: username.to_string(),
            games: ResourceClient::new(transport.clone()),
            news: ResourceClient::new(transport.clone()),
            jobs: ResourceClient::new(transport.clone()),
            users: ResourceClient::new(transport.clone()),
            roles: ResourceClient::new(transport.clone()),
            pages: ResourceClient::new(transport.clone()),
            contact: ResourceClient::new(transport.clone()),
            settings: SettingsClient::new(transport),
            created_at: now,
            last_active: Mutex::new(now),
        }
    }

    /// Update workspace activity timestamp
    pub fn touch(&self) {
        if let Ok(mut last) = self.last_active.lock() {
            *last = Utc::now();
        }
    }

    /// Check if the workspace has expired based on TTL
    pub fn is_expired(&self, ttl_seconds: i64) -> bool {
        let last = self
            .last_active
            .lock()
            .map(|l| *l)
            .unwrap_or(self.created_at);
        Utc::now().signed_duration_since(last).num_seconds() > ttl_seconds
    }
}

/// Maps a resource type to its client slot on the workspace, so generic
/// handlers can reach the right client.
pub trait WorkspaceSlot<T: Resource> {
    fn client(&self) -> &ResourceClient<T>;
}

impl WorkspaceSlot<Game> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<Game> {
        &self.games
    }
}

impl WorkspaceSlot<NewsArticle> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<NewsArticle> {
        &self.news
    }
}

impl WorkspaceSlot<Job> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<Job> {
        &self.jobs
    }
}

impl WorkspaceSlot<AdminUser> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<AdminUser> {
        &self.users
    }
}

impl WorkspaceSlot<Role> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<Role> {
        &self.roles
    }
}

impl WorkspaceSlot<Page> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<Page> {
        &self.pages
    }
}

impl WorkspaceSlot<ContactSubmission> for AdminWorkspace {
    fn client(&self) -> &ResourceClient<ContactSubmission> {
        &self.contact
    }
}

/// Registry of live admin workspaces, keyed by session token
pub struct WorkspaceRegistry {
    workspaces: DashMap<String, Arc<AdminWorkspace>>,
    transport: Arc<dyn Transport>,
    workspace_ttl: i64,
}

impl WorkspaceRegistry {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            workspaces: DashMap::new(),
            transport,
            workspace_ttl: DEFAULT_WORKSPACE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.workspace_ttl = ttl_seconds;
        self
    }

    /// Fetch the workspace for a session, creating it on first touch
    pub fn obtain(&self, session_token: &str, username: &str) -> Arc<AdminWorkspace> {
        let workspace = self
            .workspaces
            .entry(session_token.to_string())
            .or_insert_with(|| {
                let workspace = Arc::new(AdminWorkspace::new(username, self.transport.clone()));
                tracing::info!(
                    "Created workspace {} for {}",
                    workspace.workspace_id,
                    username
                );
                workspace
            })
            .clone();

        workspace.touch();
        workspace
    }

    /// Drop the workspace bound to a session token, if any
    pub fn invalidate(&self, session_token: &str) -> bool {
        if let Some((_, workspace)) = self.workspaces.remove(session_token) {
            tracing::info!(
                "Invalidated workspace {} for {}",
                workspace.workspace_id,
                workspace.username
            );
            true
        } else {
            false
        }
    }

    /// Remove expired workspaces
    pub fn cleanup_expired(&self) -> usize {
        let before = self.workspaces.len();
        let ttl = self.workspace_ttl;
        self.workspaces.retain(|_, workspace| !workspace.is_expired(ttl));
        let removed = before - self.workspaces.len();
        if removed > 0 {
            tracing::info!("Cleaned up {} expired workspaces", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}
