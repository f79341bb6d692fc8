use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::project::{NewProjectRequest, ProjectFilter, UpdateProjectRequest},
    errors::AppError,
    handlers::posts::AdminSearch,
    use_cases::extractors::AdminSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
}

#[instrument(skip(state, query))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectFilter>,
) -> impl Responder {
    let projects = state.project_handler.search_projects(&query).await;
    HttpResponse::Ok().json(projects)
}

#[instrument(skip(state))]
pub async fn featured_projects(
    state: web::Data<AppState>,
    query: web::Query<FeaturedQuery>,
) -> impl Responder {
    let projects = state.project_handler.list_featured_projects(query.limit).await;
    HttpResponse::Ok().json(projects)
}

#[instrument(skip(project_id, state))]
pub async fn get_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get_project(&project_id).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, state, query))]
pub async fn admin_list_projects(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<AdminSearch>,
) -> Result<impl Responder, AppError> {
    let projects = state
        .project_handler
        .filter_admin_projects(query.q.as_deref().unwrap_or(""))
        .await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(_admin, state, data))]
pub async fn create_project(
    _admin: AdminSession,
    state: web::Data<AppState>,
    data: web::Json<NewProjectRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.project_handler.create_project(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(_admin, project_id, state, data))]
pub async fn update_project(
    _admin: AdminSession,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, AppError> {
    let project = state
        .project_handler
        .update_project(&project_id, data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_admin, project_id, state))]
pub async fn delete_project(
    _admin: AdminSession,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete_project(&project_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
