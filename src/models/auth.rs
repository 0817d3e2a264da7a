use serde::{Deserialize, Serialize};
use validator::Validate;

use super::de::opt_id;
use super::Resource;

/// Claims read from the access token. Only expiry and identity are used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub exp: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Request de login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Response de login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "opt_id")]
    pub role: Option<i64>,
}

/// Request de registro
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must have at least 8 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<i64>,
    pub location: Option<i64>,
}

/// Backend user account (`/auth/users/{id}/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub telephone: Option<String>,
    #[serde(deserialize_with = "opt_id")]
    pub role: Option<i64>,
    #[serde(deserialize_with = "opt_id")]
    pub location: Option<i64>,
    pub company_name: Option<String>,
}

impl Resource for User {
    const PATH: &'static str = "auth/users";
    const NAME: &'static str = "user";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// Role (`/auth/role/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Resource for Role {
    const PATH: &'static str = "auth/role";
    const NAME: &'static str = "role";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// Office location (`/auth/location/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
}

impl Resource for Location {
    const PATH: &'static str = "auth/location";
    const NAME: &'static str = "location";

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let request = LoginRequest {
            email: String::new(),
            password: "secret".into(),
        };
        assert!(request.validate().is_err());

        let request = LoginRequest {
            email: "ops@carrier.com".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            username: "ops".into(),
            email: "ops-at-carrier".into(),
            password: "short".into(),
            first_name: None,
            last_name: None,
            role: Some(2),
            location: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
