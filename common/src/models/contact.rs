// common/src/models/contact.rs
use serde::{Deserialize, Serialize};

/// A message submitted through the public contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Read,
    Replied,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submissions_default_to_new() {
        let s: ContactSubmission = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Love the game!"
        }))
        .unwrap();
        assert_eq!(s.status, SubmissionStatus::New);
    }
}
