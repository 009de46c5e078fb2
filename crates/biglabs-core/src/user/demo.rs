//! Fixed identity and profile for demo mode.

use super::model::Profile;
use crate::auth::Identity;

pub const DEMO_USER_ID: &str = "demo-user-00000000";
const DEMO_EMAIL: &str = "demo@biglabs.io";

/// The synthetic demo actor.
pub fn demo_identity() -> Identity {
    Identity::new(DEMO_USER_ID, Some(DEMO_EMAIL.to_string()))
}

/// The profile shown for the demo actor.
pub fn demo_profile() -> Profile {
    Profile {
        id: DEMO_USER_ID.to_string(),
        created_at: "2024-01-15T09:00:00Z".to_string(),
        email: DEMO_EMAIL.to_string(),
        first_name: Some("Alex".to_string()),
        last_name: Some("Morgan".to_string()),
        avatar_url: None,
        company_name: Some("Biglabs".to_string()),
        role: Some("Managing Partner".to_string()),
        phone: Some("+1 (555) 010-2040".to_string()),
    }
}
