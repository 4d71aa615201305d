//! Core domain types for Onboard

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::credentials::PasswordHash;

/// A registered user of the application.
///
/// Users are created on registration and mutated on login (sets the active
/// flag), role assignment and logout. Stored as part of a JSON array under
/// the `users` key; unknown fields in stored payloads are ignored on decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub password: PasswordHash,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub is_active: bool,
}

/// Roles a user can hold inside a company.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Collaborator,
    #[serde(rename = "viewer")]
    ViewOnly,
}

impl UserRole {
    /// Stable string identifier for the role
    pub fn id(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Collaborator => "collaborator",
            Self::ViewOnly => "viewer",
        }
    }

    /// Human-readable name for UI display
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Collaborator => "Collaborator",
            Self::ViewOnly => "View only",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "collaborator" => Ok(Self::Collaborator),
            "viewer" | "view-only" => Ok(Self::ViewOnly),
            _ => Err(format!(
                "Invalid role: '{}'. Valid options: admin, collaborator, viewer",
                s
            )),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A company created during onboarding. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub category: CompanyCategory,
    pub employees_count: u32,
}

/// Supported company categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompanyCategory {
    General,
    Health,
    Retail,
    Services,
    Manufacturing,
}

impl CompanyCategory {
    /// Stable string identifier for the category
    pub fn id(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Health => "health",
            Self::Retail => "retail",
            Self::Services => "services",
            Self::Manufacturing => "manufacturing",
        }
    }

    /// Human-readable name for UI display
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Health => "Health",
            Self::Retail => "Retail",
            Self::Services => "Services",
            Self::Manufacturing => "Manufacturing",
        }
    }

    /// All selectable categories, in display order
    pub fn all() -> &'static [CompanyCategory] {
        &[
            Self::General,
            Self::Health,
            Self::Retail,
            Self::Services,
            Self::Manufacturing,
        ]
    }
}

impl std::str::FromStr for CompanyCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "health" => Ok(Self::Health),
            "retail" => Ok(Self::Retail),
            "services" => Ok(Self::Services),
            "manufacturing" => Ok(Self::Manufacturing),
            _ => Err(format!(
                "Invalid category: '{}'. Valid options: general, health, retail, services, manufacturing",
                s
            )),
        }
    }
}

impl std::fmt::Display for CompanyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Generate a fresh random entity id.
///
/// Ids are positive and below one billion. Collisions are theoretically
/// possible but irrelevant at the scale of a single on-device store.
pub fn fresh_id() -> i64 {
    rand::thread_rng().gen_range(1..1_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(
            "collaborator".parse::<UserRole>().unwrap(),
            UserRole::Collaborator
        );
        assert_eq!("viewer".parse::<UserRole>().unwrap(), UserRole::ViewOnly);

        // Case insensitive
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
    }

    #[test]
    fn test_role_from_str_invalid() {
        let result = "owner".parse::<UserRole>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid role: 'owner'"));
    }

    #[test]
    fn test_role_display_matches_id() {
        for role in [UserRole::Admin, UserRole::Collaborator, UserRole::ViewOnly] {
            assert_eq!(role.to_string(), role.id());
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "retail".parse::<CompanyCategory>().unwrap(),
            CompanyCategory::Retail
        );
        assert_eq!(
            "Manufacturing".parse::<CompanyCategory>().unwrap(),
            CompanyCategory::Manufacturing
        );
        assert!("unknown".parse::<CompanyCategory>().is_err());
    }

    #[test]
    fn test_category_all_covers_every_variant() {
        assert_eq!(CompanyCategory::all().len(), 5);
    }

    #[test]
    fn test_company_json_round_trip() {
        let companies = vec![
            Company {
                id: 1,
                name: "Acme".to_string(),
                category: CompanyCategory::Retail,
                employees_count: 20,
            },
            Company {
                id: 2,
                name: "Clinic".to_string(),
                category: CompanyCategory::Health,
                employees_count: 7,
            },
        ];

        let json = serde_json::to_string(&companies).unwrap();
        let decoded: Vec<Company> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, companies);
    }

    #[test]
    fn test_user_decode_ignores_unknown_fields() {
        let json = r#"{
            "id": 42,
            "full_name": "Ana",
            "email": "ana@x.com",
            "password": {"salt": "c2FsdA==", "hash": "aGFzaA==", "iterations": 1000},
            "role": "admin",
            "is_active": true,
            "legacy_field": "ignored"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.role, Some(UserRole::Admin));
        assert!(user.is_active);
    }

    #[test]
    fn test_user_decode_missing_optional_fields() {
        // Older payloads may predate the role and active fields
        let json = r#"{
            "id": 7,
            "full_name": "Demo",
            "email": "demo@x.com",
            "password": {"salt": "c2FsdA==", "hash": "aGFzaA==", "iterations": 1000}
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, None);
        assert!(!user.is_active);
    }

    #[test]
    fn test_fresh_id_in_range() {
        for _ in 0..100 {
            let id = fresh_id();
            assert!(id >= 1);
            assert!(id < 1_000_000_000);
        }
    }
}
