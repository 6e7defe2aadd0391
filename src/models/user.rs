use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Quota {
    pub free: f64,
    pub used: f64,
    pub total: f64,
    pub relative: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub display_name: String,
    pub email: String,
    pub enabled: bool,
    pub quota: Quota,
}

/// Attributes writable through `set_user_attribute`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserAttributeKey {
    #[serde(rename = "display")]
    DisplayName,
    #[serde(rename = "quota")]
    Quota,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "email")]
    Email,
}

impl UserAttributeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAttributeKey::DisplayName => "display",
            UserAttributeKey::Quota => "quota",
            UserAttributeKey::Password => "password",
            UserAttributeKey::Email => "email",
        }
    }
}

impl std::fmt::Display for UserAttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for UserAttributeKey {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "display" => Ok(UserAttributeKey::DisplayName),
            "quota" => Ok(UserAttributeKey::Quota),
            "password" => Ok(UserAttributeKey::Password),
            "email" => Ok(UserAttributeKey::Email),
            _ => Err(format!("Invalid user attribute: {}", value)),
        }
    }
}
