use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::post::{NewPostRequest, PostFilter, UpdatePostRequest},
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct AdminSearch {
    pub q: Option<String>,
}

#[instrument(skip(state, query))]
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostFilter>,
) -> impl Responder {
    let posts = state.post_handler.search_posts(&query).await;
    HttpResponse::Ok().json(posts)
}

#[instrument(skip(post_id, state))]
pub async fn get_post(
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.post_handler.get_post(&post_id).await?;
    Ok(HttpResponse::Ok().json(post.to_detail_response()))
}

#[instrument(skip(post_id, state))]
pub async fn related_posts(
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.post_handler.get_post(&post_id).await?;
    let related = state.post_handler.related_posts(&post).await;
    Ok(HttpResponse::Ok().json(related))
}

#[instrument(skip(_admin, state, query))]
pub async fn admin_list_posts(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<AdminSearch>,
) -> Result<impl Responder, AppError> {
    let posts = state
        .post_handler
        .filter_admin_posts(query.q.as_deref().unwrap_or(""))
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_post(
    _admin: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<NewPostRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.post_handler.create_post(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(_admin, post_id, state, data))]
pub async fn update_post(
    _admin: AdminSession,
    post_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdatePostRequest>,
) -> Result<impl Responder, AppError> {
    let post = state.post_handler.update_post(&post_id, data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[instrument(skip(_admin, post_id, state))]
pub async fn delete_post(
    _admin: AdminSession,
    post_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.post_handler.delete_post(&post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
