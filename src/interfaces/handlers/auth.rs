use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use crate::entities::token::{LoginUser, OAuthSignIn, SessionResponse};
use crate::session::SessionState;
use crate::use_cases::extractors::{bearer_token, BearerToken};
use crate::utils::get_client_ip::get_client_ip;
use crate::AppState;

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: web::Json<LoginUser>
) -> impl Responder {
    let client_ip = get_client_ip(&req, state.trust_forwarded_for);
    match state.auth_handler.login(user.into_inner(), &client_ip).await {
        Ok(auth_response) => HttpResponse::Ok().json(auth_response),
        Err(e) => e.to_http_response(),
    }
}

#[post("/oauth")]
pub async fn oauth_sign_in(
    state: web::Data<AppState>,
    request: web::Json<OAuthSignIn>
) -> impl Responder {
    match state.auth_handler.visitor_sign_in(request.into_inner()).await {
        Ok(auth_response) => HttpResponse::Ok().json(auth_response),
        Err(e) => e.to_http_response(),
    }
}

#[post("/logout")]
pub async fn logout(
    token: BearerToken,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.auth_handler.sign_out(&token.0) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({"message": "Logged out successfully"})),
        Err(e) => e.to_http_response(),
    }
}

/// Current session as seen by the server. Always 200; the body says whether
/// the caller is signed in.
#[get("/session")]
pub async fn current_session(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> impl Responder {
    let token = bearer_token(&req);
    let body = match state.auth_handler.resolve_session(token.as_deref()) {
        SessionState::Authenticated(user) => SessionResponse::Authenticated { user },
        _ => SessionResponse::Unauthenticated {
            redirect: state.login_path.clone(),
        },
    };
    HttpResponse::Ok().json(body)
}
