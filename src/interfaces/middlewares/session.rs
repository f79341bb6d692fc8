use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    session::{GuardDecision, SessionHub},
    use_cases::extractors::bearer_token,
    AppState,
};

/// Admits only the site owner. Everything else is answered here: 401 with a
/// `redirect` to the login path, or 403 for visitor sessions.
pub struct SessionMiddleware;

impl<S> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in session middleware");
                return Ok(req.into_response(HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))));
            };

            let hub = SessionHub::new();
            let mut guard = hub.guard(state.login_path.as_str());
            let token = bearer_token(req.request());
            hub.publish(state.auth_handler.resolve_session(token.as_deref()));

            match guard.resolved().await {
                GuardDecision::Render(identity) => {
                    req.extensions_mut().insert(identity);
                    service.call(req).await
                }
                GuardDecision::Forbidden => {
                    tracing::warn!(path = %req.path(), "Visitor session denied admin access");
                    Ok(req.into_response(HttpResponse::Forbidden().json(serde_json::json!({
                        "error": "Admin access required"
                    }))))
                }
                GuardDecision::Redirect(login_path) => {
                    Ok(req.into_response(unauthenticated(&login_path)))
                }
                GuardDecision::Loading => {
                    Ok(req.into_response(unauthenticated(&state.login_path)))
                }
            }
        })
    }
}

fn unauthenticated(login_path: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Authentication required",
        "redirect": login_path
    }))
}
