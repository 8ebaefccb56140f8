//! Per-user scientist profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::UserId;

const DEFAULT_TITLE: &str = "Environmental Scientist";
const DEFAULT_BIO: &str = "Researching water quality and heavy metal contamination.";
const DEFAULT_EXPERTISE: [&str; 3] = [
    "Water Quality",
    "Heavy Metals",
    "Environmental Monitoring",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScientistProfile {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub organization: String,
    pub title: String,
    pub bio: String,
    pub expertise: Vec<String>,
    pub phone: String,
    pub website: String,
    pub location: String,
    pub updated_at: DateTime<Utc>,
}

impl ScientistProfile {
    /// Profile created the first time a user opens their profile page.
    pub fn default_for(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: String::new(),
            organization: String::new(),
            title: DEFAULT_TITLE.to_string(),
            bio: DEFAULT_BIO.to_string(),
            expertise: DEFAULT_EXPERTISE.iter().map(|s| s.to_string()).collect(),
            phone: String::new(),
            website: String::new(),
            location: String::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Partial profile update; `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub expertise: Option<Vec<String>>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, mut profile: ScientistProfile) -> ScientistProfile {
        if let Some(v) = self.name {
            profile.name = v;
        }
        if let Some(v) = self.email {
            profile.email = v;
        }
        if let Some(v) = self.organization {
            profile.organization = v;
        }
        if let Some(v) = self.title {
            profile.title = v;
        }
        if let Some(v) = self.bio {
            profile.bio = v;
        }
        if let Some(v) = self.expertise {
            profile.expertise = v;
        }
        if let Some(v) = self.phone {
            profile.phone = v;
        }
        if let Some(v) = self.website {
            profile.website = v;
        }
        if let Some(v) = self.location {
            profile.location = v;
        }
        profile.updated_at = Utc::now();
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let p = ScientistProfile::default_for(UserId(4), "scientist1");
        assert_eq!(p.name, "scientist1");
        assert_eq!(p.title, "Environmental Scientist");
        assert_eq!(p.expertise.len(), 3);
        assert!(p.email.is_empty());
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let p = ScientistProfile::default_for(UserId(4), "scientist1");
        let updated = ProfileUpdate {
            organization: Some("CGWB".to_string()),
            expertise: Some(vec!["Hydrology".to_string()]),
            ..Default::default()
        }
        .apply(p.clone());

        assert_eq!(updated.organization, "CGWB");
        assert_eq!(updated.expertise, vec!["Hydrology".to_string()]);
        assert_eq!(updated.name, p.name);
        assert_eq!(updated.bio, p.bio);
    }
}
