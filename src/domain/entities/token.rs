use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: Identity,
}

impl AuthResponse {
    pub fn new(access_token: String, expires_in: i64, user: Identity) -> Self {
        AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub admin: bool,
    pub jti: String,
    pub exp: usize,
    pub iat: usize,
}

/// Who a session belongs to: the site owner or a guestbook visitor.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub admin: bool,
}

impl Identity {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Identity {
            uid: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            picture: claims.picture.clone(),
            admin: claims.admin,
        }
    }
}

/// Profile returned by the identity provider's userinfo endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OAuthProfile {
    pub sub: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
}

impl From<OAuthProfile> for Identity {
    fn from(profile: OAuthProfile) -> Self {
        Identity {
            uid: profile.sub,
            email: profile.email,
            name: profile.name,
            picture: profile.picture,
            admin: false,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OAuthSignIn {
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SessionResponse {
    Authenticated { user: Identity },
    Unauthenticated { redirect: String },
}
