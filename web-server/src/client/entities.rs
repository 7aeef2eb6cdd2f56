// web-server/src/client/entities.rs
//
// Bindings from the shared models to the content API collections the
// admin panel manages.
use common::models::contact::ContactSubmission;
use common::models::game::Game;
use common::models::job::Job;
use common::models::news::NewsArticle;
use common::models::page::Page;
use common::models::user::{AdminUser, Role};

use crate::client::resource::Resource;

impl Resource for Game {
    const BASE_PATH: &'static str = "/api/games";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "slug"];

    fn key(&self) -> &str {
        &self.slug
    }
}

impl Resource for NewsArticle {
    const BASE_PATH: &'static str = "/api/news";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "slug", "content"];

    fn key(&self) -> &str {
        &self.slug
    }
}

impl Resource for Job {
    const BASE_PATH: &'static str = "/api/jobs";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "department", "location"];

    fn key(&self) -> &str {
        &self.id
    }
}

impl Resource for AdminUser {
    const BASE_PATH: &'static str = "/api/users";
    const REQUIRED_FIELDS: &'static [&'static str] = &["email"];

    fn key(&self) -> &str {
        &self.id
    }
}

impl Resource for Role {
    const BASE_PATH: &'static str = "/api/roles";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "displayName"];

    fn key(&self) -> &str {
        &self.id
    }
}

impl Resource for Page {
    const BASE_PATH: &'static str = "/api/pages";
    const REQUIRED_FIELDS: &'static [&'static str] = &["title", "slug"];

    fn key(&self) -> &str {
        &self.slug
    }
}

impl Resource for ContactSubmission {
    const BASE_PATH: &'static str = "/api/contact";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email", "message"];

    fn key(&self) -> &str {
        &self.id
    }
}
