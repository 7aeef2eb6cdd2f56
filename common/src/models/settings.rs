// common/src/models/settings.rs
use serde::{Deserialize, Serialize};

/// Site-wide settings singleton, edited as a single record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub appearance: AppearanceSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub site_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            site_name: "Emberhollow Studios".to_string(),
            tagline: String::new(),
            contact_email: String::new(),
            social_links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSettings {
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub accent_color: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default)]
    pub notify_on_contact: bool,
    #[serde(default)]
    pub notification_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_the_studio_name() {
        let settings = SiteSettings::default();
        assert_eq!(settings.general.site_name, "Emberhollow Studios");
        assert!(!settings.security.maintenance_mode);
    }

    #[test]
    fn partial_payloads_fill_in_defaults() {
        let settings: SiteSettings = serde_json::from_value(serde_json::json!({
            "general": { "siteName": "Emberhollow", "tagline": "Forged in the dark" }
        }))
        .unwrap();
        assert_eq!(settings.general.tagline, "Forged in the dark");
        assert_eq!(settings.appearance.theme, "");
    }
}
