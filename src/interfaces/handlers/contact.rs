use actix_web::{post, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::contact::ContactForm, errors::AppError, AppState};

#[post("/contact")]
#[instrument(skip(state, form))]
pub async fn submit_contact(
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<impl Responder, AppError> {
    let response = state.contact_handler.submit(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
