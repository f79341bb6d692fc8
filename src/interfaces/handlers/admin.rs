use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use tracing::instrument;

use crate::{
    entities::{post::PostStats, project::ProjectStats},
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

#[derive(Debug, Serialize)]
struct DashboardResponse {
    message: String,
    posts: PostStats,
    projects: ProjectStats,
}

#[get("/dashboard")]
#[instrument(skip(admin, state))]
pub async fn admin_dashboard(
    admin: AdminSession,
    state: web::Data<AppState>
) -> Result<impl Responder, AppError> {
    let posts = state.post_handler.post_stats().await?;
    let projects = state.project_handler.project_stats().await?;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        message: format!("Welcome back, {}", admin.0.display_name()),
        posts,
        projects,
    }))
}
