//! Profile domain model.

use serde::{Deserialize, Serialize};

/// Display and editable attributes for an authenticated user.
///
/// Field names follow the `profiles` table so rows deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub created_at: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Profile {
    /// Two-letter avatar initials, or `"??"` unless both names are set.
    pub fn initials(&self) -> String {
        match (first_char(&self.first_name), first_char(&self.last_name)) {
            (Some(first), Some(last)) => format!("{first}{last}"),
            _ => "??".to_string(),
        }
    }

    /// Full name when known, otherwise the email address.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

fn first_char(value: &Option<String>) -> Option<char> {
    value.as_deref().and_then(|v| v.trim().chars().next())
}

/// Partial update of the editable profile fields.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the provided fields to `profile`.
    pub fn apply_to(&self, profile: &mut Profile) {
        let fields = [
            (&self.first_name, &mut profile.first_name),
            (&self.last_name, &mut profile.last_name),
            (&self.company_name, &mut profile.company_name),
            (&self.role, &mut profile.role),
            (&self.phone, &mut profile.phone),
            (&self.avatar_url, &mut profile.avatar_url),
        ];
        for (update, target) in fields {
            if let Some(value) = update {
                *target = Some(value.clone());
            }
        }
    }
}
