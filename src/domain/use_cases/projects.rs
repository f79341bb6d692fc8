use std::cmp::Reverse;

use validator::Validate;

use crate::{
    entities::project::{
        is_legacy_selected, NewProjectRequest, Project, ProjectCreatedResponse, ProjectFilter, ProjectStats,
        ProjectStatus, UpdateProjectRequest, PROJECTS, SELECTED_WORK,
    },
    errors::{AppError, StoreError},
    repositories::document_store::{decode_documents, Direction, DocumentStore, Query, CREATED_AT},
    utils::text::contains_ci,
};

pub const DEFAULT_FEATURED_LIMIT: usize = 3;
pub const MAX_FEATURED_LIMIT: usize = 12;

pub struct ProjectHandler<S>
where
    S: DocumentStore,
{
    pub store: S,
}

impl<S> ProjectHandler<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        ProjectHandler { store }
    }

    pub async fn try_list_projects(&self) -> Result<Vec<Project>, AppError> {
        let query = Query::new().order_by(CREATED_AT, Direction::Descending);
        let docs = self.store.query(PROJECTS, &query).await?;
        Ok(decode_documents(PROJECTS, docs))
    }

    /// All projects, newest first; an empty list when the store cannot answer.
    pub async fn list_projects(&self) -> Vec<Project> {
        self.try_list_projects().await.unwrap_or_else(|e| {
            tracing::warn!("Listing projects failed, serving none: {}", e);
            Vec::new()
        })
    }

    /// Selected work for the home page.
    ///
    /// The store is only asked for the equality match; ordering by
    /// `createdAt` happens here so the store never needs a composite index
    /// on (`selectedWork`, `createdAt`). Documents that predate
    /// `selectedWork` and only carry `featured` are included too.
    pub async fn list_featured_projects(&self, limit: Option<usize>) -> Vec<Project> {
        let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT).min(MAX_FEATURED_LIMIT);
        if limit == 0 {
            return Vec::new();
        }

        match self.try_featured_projects().await {
            Ok(mut projects) => {
                // Stable: equal or missing stamps keep store order.
                projects.sort_by_key(|p| Reverse(p.created_at));
                projects.truncate(limit);
                projects
            }
            Err(e) => {
                tracing::warn!("Listing featured projects failed, serving none: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_featured_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut docs = self
            .store
            .query(PROJECTS, &Query::new().where_eq(SELECTED_WORK, true))
            .await?;

        let legacy = self
            .store
            .query(PROJECTS, &Query::new().where_eq("featured", true))
            .await?;
        docs.extend(legacy.into_iter().filter(|doc| is_legacy_selected(&doc.data)));

        Ok(decode_documents(PROJECTS, docs))
    }

    /// Title or tag contains `q`, optionally restricted to one status.
    pub async fn search_projects(&self, filter: &ProjectFilter) -> Vec<Project> {
        let needle = filter.q.as_deref().unwrap_or("").trim();

        self.list_projects()
            .await
            .into_iter()
            .filter(|p| contains_ci(&p.title, needle) || p.tags.iter().any(|t| contains_ci(t, needle)))
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .collect()
    }

    /// Admin table search over title or status.
    pub async fn filter_admin_projects(&self, q: &str) -> Result<Vec<Project>, AppError> {
        let needle = q.trim();
        Ok(self
            .try_list_projects()
            .await?
            .into_iter()
            .filter(|p| contains_ci(&p.title, needle) || contains_ci(p.status.as_str(), needle))
            .collect())
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, AppError> {
        let missing = || {
            AppError::NotFound("Project not found".into()).redirect_missing("Project not found", "/projects")
        };
        if id.trim().is_empty() {
            return Err(missing());
        }

        let doc = self.store.get(PROJECTS, id).await?.ok_or_else(missing)?;
        Ok(Project::try_from(doc)?)
    }

    pub async fn create_project(&self, request: NewProjectRequest) -> Result<ProjectCreatedResponse, AppError> {
        request.validate()?;

        let data = request.into_document();
        let slug = data
            .get("slug")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let id = self.store.add(PROJECTS, data).await?;
        tracing::info!(project_id = %id, "Project created");

        Ok(ProjectCreatedResponse { id, slug })
    }

    pub async fn update_project(&self, id: &str, request: UpdateProjectRequest) -> Result<Project, AppError> {
        request.validate()?;

        self.store
            .update(PROJECTS, id, request.into_patch())
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::NotFound(_) => AppError::NotFound("Project not found".to_string()),
                other => other,
            })?;

        tracing::info!(project_id = %id, "Project updated");
        self.get_project(id).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(PROJECTS, id).await.map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::NotFound("Project not found".to_string()),
            other => other,
        })?;

        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    pub async fn project_stats(&self) -> Result<ProjectStats, AppError> {
        let projects = self.try_list_projects().await?;
        Ok(ProjectStats {
            total: projects.len(),
            selected_work: projects.iter().filter(|p| p.selected_work).count(),
            completed: projects.iter().filter(|p| p.status == ProjectStatus::Completed).count(),
        })
    }
}
