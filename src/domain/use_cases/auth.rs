use std::time::Duration;

use validator::Validate;

use crate::auth::password::{verify_decoy, verify_password};
use crate::auth::revocation::RevocationList;
use crate::entities::token::{AuthResponse, Claims, Identity, LoginUser, OAuthSignIn};
use crate::errors::AuthError;
use crate::limiter::rate_limiter::AttemptLimiter;
use crate::repositories::identity::OAuthProfileProvider;
use crate::repositories::token::TokenServiceRepository;
use crate::session::SessionState;
use crate::settings::AppConfig;

/// The single account allowed into the admin area.
#[derive(Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password_hash: String,
}

impl From<&AppConfig> for AdminAccount {
    fn from(config: &AppConfig) -> Self {
        AdminAccount {
            email: config.admin_email.trim().to_string(),
            password_hash: config.admin_password_hash.clone(),
        }
    }
}

pub struct AuthHandler<T, P>
where
    T: TokenServiceRepository,
    P: OAuthProfileProvider,
{
    pub token_service: T,
    pub oauth: P,
    pub admin: AdminAccount,
    pub revocations: RevocationList,
    pub limiter: AttemptLimiter,
}

impl<T, P> AuthHandler<T, P>
where
    T: TokenServiceRepository,
    P: OAuthProfileProvider,
{
    pub fn new(config: &AppConfig, token_service: T, oauth: P) -> Self {
        AuthHandler {
            token_service,
            oauth,
            admin: AdminAccount::from(config),
            revocations: RevocationList::new(),
            limiter: AttemptLimiter::new(
                config.login_max_attempts,
                Duration::from_secs(config.login_window_secs),
            ),
        }
    }

    /// Signs in the site owner. Attempts are throttled per client and email;
    /// a throttled attempt never reaches the password check.
    pub async fn login(&self, request: LoginUser, client_ip: &str) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let throttle_key = format!("{}|{}", client_ip, email);

        if let Err(retry_after) = self.limiter.check(&throttle_key) {
            tracing::warn!(client_ip, retry_after, "Login throttled");
            return Err(AuthError::TooManyAttempts);
        }

        let is_admin_email = email == self.admin.email.to_lowercase();
        let is_password_valid = if is_admin_email {
            verify_password(&request.password, &self.admin.password_hash).map_err(|e| {
                tracing::error!("Admin password hash unusable: {}", e);
                AuthError::WrongCredentials
            })?
        } else {
            verify_decoy(&request.password)
        };

        if !is_password_valid {
            tracing::info!(client_ip, "Rejected admin login");
            return Err(AuthError::WrongCredentials);
        }

        self.limiter.reset(&throttle_key);

        let identity = Identity {
            uid: "admin".to_string(),
            email: Some(self.admin.email.clone()),
            name: Some("Admin".to_string()),
            picture: None,
            admin: true,
        };

        let response = self.create_auth_response(identity)?;
        tracing::info!("Admin logged in successfully");
        Ok(response)
    }

    /// Signs in a guestbook visitor with an access token from the identity
    /// provider's popup flow.
    pub async fn visitor_sign_in(&self, request: OAuthSignIn) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let profile = self.oauth.fetch_profile(request.access_token.trim()).await?;
        let identity = Identity::from(profile);

        tracing::info!(uid = %identity.uid, "Visitor signed in");
        self.create_auth_response(identity)
    }

    pub fn create_auth_response(&self, identity: Identity) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(&identity)
            .map_err(|e| {
                tracing::warn!("Failed to create JWT: {}", e);
                AuthError::TokenCreation
            })?;

        Ok(AuthResponse::new(access_token, self.token_service.expires_in(), identity))
    }

    /// Decodes a bearer token, rejecting ones revoked by sign-out.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.token_service.decode_jwt(token)?.claims;
        if self.revocations.is_revoked(&claims.jti) {
            return Err(AuthError::TokenRevoked);
        }
        Ok(claims)
    }

    /// Revokes the token until it expires. Signing out twice is harmless.
    pub fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let claims = match self.verify_token(token) {
            Ok(claims) => claims,
            Err(AuthError::TokenRevoked) => return Ok(()),
            Err(e) => return Err(e),
        };

        self.revocations.revoke(&claims.jti, claims.exp);
        tracing::info!(uid = %claims.sub, "Signed out");
        Ok(())
    }

    /// Session state for an optional bearer token.
    pub fn resolve_session(&self, token: Option<&str>) -> SessionState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionState::Unauthenticated;
        };

        match self.verify_token(token) {
            Ok(claims) => SessionState::Authenticated(Identity::from(&claims)),
            Err(e) => {
                tracing::debug!("Session rejected: {}", e);
                SessionState::Unauthenticated
            }
        }
    }

    /// Hourly housekeeping: forget expired revocations and idle throttles.
    pub fn purge_expired(&self) -> (usize, usize) {
        (self.revocations.purge_expired(), self.limiter.evict_idle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{jwt::JwtService, password::hash_password},
        entities::token::OAuthProfile,
        repositories::identity::mocks::MockProfileProvider,
        settings::AppEnvironment,
    };
    use once_cell::sync::Lazy;

    static ADMIN_HASH: Lazy<String> = Lazy::new(|| hash_password("s3cret-Passw0rd").unwrap());

    fn config() -> AppConfig {
        let mut config: AppConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        config.env = AppEnvironment::Testing;
        config.jwt_secret = "z".repeat(48);
        config.admin_email = "Owner@Example.dev".into();
        config.admin_password_hash = ADMIN_HASH.clone();
        config.login_max_attempts = 3;
        config
    }

    fn handler(oauth: MockProfileProvider) -> AuthHandler<JwtService, MockProfileProvider> {
        let config = config();
        AuthHandler::new(&config, JwtService::new(&config), oauth)
    }

    fn login(email: &str, password: &str) -> LoginUser {
        LoginUser { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn admin_login_issues_admin_session() {
        let auth = handler(MockProfileProvider::new());
        let response = auth.login(login("owner@example.dev", "s3cret-Passw0rd"), "1.1.1.1").await.unwrap();

        assert!(response.user.admin);
        match auth.resolve_session(Some(&response.access_token)) {
            SessionState::Authenticated(identity) => assert!(identity.admin),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let auth = handler(MockProfileProvider::new());

        let wrong_password = auth.login(login("owner@example.dev", "nope"), "1.1.1.1").await;
        let wrong_email = auth.login(login("someone@example.dev", "s3cret-Passw0rd"), "1.1.1.1").await;

        assert_eq!(wrong_password.unwrap_err(), AuthError::WrongCredentials);
        assert_eq!(wrong_email.unwrap_err(), AuthError::WrongCredentials);
    }

    #[tokio::test]
    async fn throttle_blocks_even_correct_credentials() {
        let auth = handler(MockProfileProvider::new());
        for _ in 0..3 {
            let _ = auth.login(login("owner@example.dev", "guess"), "2.2.2.2").await;
        }

        let blocked = auth.login(login("owner@example.dev", "s3cret-Passw0rd"), "2.2.2.2").await;
        assert_eq!(blocked.unwrap_err(), AuthError::TooManyAttempts);

        let other_client = auth.login(login("owner@example.dev", "s3cret-Passw0rd"), "3.3.3.3").await;
        assert!(other_client.is_ok());
    }

    #[tokio::test]
    async fn success_resets_the_throttle() {
        let auth = handler(MockProfileProvider::new());
        let _ = auth.login(login("owner@example.dev", "guess"), "4.4.4.4").await;
        let _ = auth.login(login("owner@example.dev", "guess"), "4.4.4.4").await;
        auth.login(login("owner@example.dev", "s3cret-Passw0rd"), "4.4.4.4").await.unwrap();

        for _ in 0..2 {
            let _ = auth.login(login("owner@example.dev", "guess"), "4.4.4.4").await;
        }
        assert!(auth.login(login("owner@example.dev", "s3cret-Passw0rd"), "4.4.4.4").await.is_ok());
    }

    #[tokio::test]
    async fn visitor_sign_in_is_never_admin() {
        let mut oauth = MockProfileProvider::new();
        oauth
            .expect_fetch_profile()
            .withf(|token| token == "ya29.token")
            .returning(|_| {
                Ok(OAuthProfile {
                    sub: "1234567890".into(),
                    name: Some("Ada".into()),
                    picture: Some("https://example.com/ada.png".into()),
                    email: Some("ada@example.com".into()),
                })
            });

        let auth = handler(oauth);
        let response = auth
            .visitor_sign_in(OAuthSignIn { access_token: "ya29.token".into() })
            .await
            .unwrap();

        assert!(!response.user.admin);
        assert_eq!(response.user.uid, "1234567890");
    }

    #[tokio::test]
    async fn rejected_provider_token_fails_sign_in() {
        let mut oauth = MockProfileProvider::new();
        oauth
            .expect_fetch_profile()
            .returning(|_| Err(AuthError::OAuthRejected("access token not accepted".into())));

        let auth = handler(oauth);
        let result = auth.visitor_sign_in(OAuthSignIn { access_token: "bad".into() }).await;
        assert!(matches!(result, Err(AuthError::OAuthRejected(_))));
    }

    #[tokio::test]
    async fn sign_out_revokes_immediately() {
        let auth = handler(MockProfileProvider::new());
        let token = auth
            .login(login("owner@example.dev", "s3cret-Passw0rd"), "5.5.5.5")
            .await
            .unwrap()
            .access_token;

        auth.sign_out(&token).unwrap();
        assert_eq!(auth.verify_token(&token).unwrap_err(), AuthError::TokenRevoked);
        assert_eq!(auth.resolve_session(Some(&token)), SessionState::Unauthenticated);
        assert!(auth.sign_out(&token).is_ok());
    }

    #[test]
    fn missing_token_is_unauthenticated() {
        let auth = handler(MockProfileProvider::new());
        assert_eq!(auth.resolve_session(None), SessionState::Unauthenticated);
        assert_eq!(auth.resolve_session(Some("garbage")), SessionState::Unauthenticated);
    }
}
