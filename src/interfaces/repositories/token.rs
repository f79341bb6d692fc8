use jsonwebtoken::TokenData;

use crate::{entities::token::{Claims, Identity}, errors::AuthError};

pub trait TokenServiceRepository: Send + Sync {
    /// Issues a signed session token for the identity
    fn create_jwt(&self, identity: &Identity) -> Result<String, AuthError>;

    /// Decodes a session token and returns the claims
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;

    /// Lifetime of issued tokens, in seconds
    fn expires_in(&self) -> i64;
}
