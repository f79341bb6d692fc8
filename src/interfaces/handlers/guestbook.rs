use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::guestbook::{GuestbookQuery, NewGuestbookEntry},
    errors::AppError,
    use_cases::extractors::VisitorSession,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_entries(
    state: web::Data<AppState>,
    query: web::Query<GuestbookQuery>,
) -> impl Responder {
    let entries = state.guestbook_handler.list_entries(query.limit).await;
    HttpResponse::Ok().json(entries)
}

#[instrument(skip(session, state, data), fields(uid = %session.0.uid))]
pub async fn sign_guestbook(
    session: VisitorSession,
    state: web::Data<AppState>,
    data: web::Json<NewGuestbookEntry>,
) -> Result<impl Responder, AppError> {
    let entry = state.guestbook_handler.sign(&session.0, data.into_inner()).await?;
    Ok(HttpResponse::Created().json(entry))
}
