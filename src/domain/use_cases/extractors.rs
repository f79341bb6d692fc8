use actix_web::{dev::Payload, http::header, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::token::Identity, errors::AuthError, session::SessionState, AppState};

/// Raw bearer token from the `Authorization` header.
#[derive(Debug)]
pub struct BearerToken(pub String);

pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequest for BearerToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match bearer_token(req) {
            Some(token) => ready(Ok(BearerToken(token))),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}

/// Any signed-in session, owner or visitor.
/// Returns 401 when the token is missing, expired or signed out.
#[derive(Debug)]
pub struct VisitorSession(pub Identity);

impl FromRequest for VisitorSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(identity) = req.extensions().get::<Identity>() {
            return ready(Ok(VisitorSession(identity.clone())));
        }

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(actix_web::error::ErrorInternalServerError("application state missing")));
        };

        let token = bearer_token(req);
        match state.auth_handler.resolve_session(token.as_deref()) {
            SessionState::Authenticated(identity) => ready(Ok(VisitorSession(identity))),
            _ => ready(Err(AuthError::InvalidToken.into())),
        }
    }
}

/// The site owner, as admitted by the session middleware.
/// Returns 403 for visitor sessions and 401 when nothing was admitted.
#[derive(Debug)]
pub struct AdminSession(pub Identity);

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>() {
            Some(identity) if identity.admin => {
                ready(Ok(AdminSession(identity.clone())))
            }
            Some(_) => {
                ready(Err(AuthError::Forbidden("Admin access required".into()).into()))
            }
            None => {
                ready(Err(AuthError::InvalidToken.into()))
            }
        }
    }
}
