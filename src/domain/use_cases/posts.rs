use chrono::Utc;
use validator::Validate;

use crate::{
    entities::post::{
        Category, NewPostRequest, Post, PostCreatedResponse, PostFilter, PostStats, UpdatePostRequest, POSTS,
    },
    errors::AppError,
    repositories::document_store::{decode_documents, Direction, DocumentStore, Query, CREATED_AT},
    utils::text::contains_ci,
};

const RELATED_CANDIDATES: usize = 3;
const RELATED_LIMIT: usize = 2;

pub struct PostHandler<S>
where
    S: DocumentStore,
{
    pub store: S,
}

impl<S> PostHandler<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        PostHandler { store }
    }

    /// All posts, newest first.
    pub async fn try_list_posts(&self) -> Result<Vec<Post>, AppError> {
        let query = Query::new().order_by(CREATED_AT, Direction::Descending);
        let docs = self.store.query(POSTS, &query).await?;
        Ok(decode_documents(POSTS, docs))
    }

    /// All posts, newest first; an empty list when the store cannot answer.
    pub async fn list_posts(&self) -> Vec<Post> {
        self.try_list_posts().await.unwrap_or_else(|e| {
            tracing::warn!("Listing posts failed, serving none: {}", e);
            Vec::new()
        })
    }

    /// Public blog filter: title or excerpt contains `q`, and the category
    /// matches unless it is `All`.
    pub async fn search_posts(&self, filter: &PostFilter) -> Vec<Post> {
        let needle = filter.q.as_deref().unwrap_or("").trim();
        let category = filter
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "All");

        self.list_posts()
            .await
            .into_iter()
            .filter(|post| contains_ci(&post.title, needle) || contains_ci(&post.excerpt, needle))
            .filter(|post| category.is_none_or(|c| post.category.as_str() == c))
            .collect()
    }

    /// Admin table search over title or category.
    pub async fn filter_admin_posts(&self, q: &str) -> Result<Vec<Post>, AppError> {
        let needle = q.trim();
        Ok(self
            .try_list_posts()
            .await?
            .into_iter()
            .filter(|post| contains_ci(&post.title, needle) || contains_ci(post.category.as_str(), needle))
            .collect())
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, AppError> {
        let missing = || AppError::NotFound("Post not found".into()).redirect_missing("Post not found", "/blog");
        if id.trim().is_empty() {
            return Err(missing());
        }

        let doc = self.store.get(POSTS, id).await?.ok_or_else(missing)?;
        Ok(Post::try_from(doc)?)
    }

    /// Up to two other posts from the same category.
    pub async fn related_posts(&self, post: &Post) -> Vec<Post> {
        let query = Query::new()
            .where_eq("category", post.category.as_str())
            .limit(RELATED_CANDIDATES);

        match self.store.query(POSTS, &query).await {
            Ok(docs) => decode_documents::<Post>(POSTS, docs)
                .into_iter()
                .filter(|candidate| candidate.id != post.id)
                .take(RELATED_LIMIT)
                .collect(),
            Err(e) => {
                tracing::warn!(post_id = %post.id, "Related posts unavailable: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn create_post(&self, request: NewPostRequest) -> Result<PostCreatedResponse, AppError> {
        request.validate()?;

        let data = request.into_document(Utc::now());
        let slug = data
            .get("slug")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let id = self.store.add(POSTS, data).await?;
        tracing::info!(post_id = %id, "Post created");

        Ok(PostCreatedResponse { id, slug })
    }

    pub async fn update_post(&self, id: &str, request: UpdatePostRequest) -> Result<Post, AppError> {
        request.validate()?;

        let patch = request.into_patch(Utc::now());
        self.store.update(POSTS, id, patch).await.map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::NotFound("Post not found".to_string()),
            other => other,
        })?;

        tracing::info!(post_id = %id, "Post updated");
        self.get_post(id).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(POSTS, id).await.map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::NotFound("Post not found".to_string()),
            other => other,
        })?;

        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn post_stats(&self) -> Result<PostStats, AppError> {
        let posts = self.try_list_posts().await?;
        Ok(PostStats {
            total: posts.len(),
            featured: posts.iter().filter(|p| p.featured).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::StoreError,
        repositories::{document_store::mocks::MockStore, memory_store::MemoryDocumentStore},
    };
    use serde_json::json;

    fn draft(title: &str, category: Category, featured: bool) -> NewPostRequest {
        NewPostRequest {
            title: title.to_string(),
            slug: None,
            excerpt: format!("About {title}"),
            content: "Some body text".into(),
            category,
            image: None,
            read_time: None,
            featured,
        }
    }

    async fn seeded() -> PostHandler<MemoryDocumentStore> {
        let handler = PostHandler::new(MemoryDocumentStore::new());
        handler.create_post(draft("Rust ownership", Category::Development, true)).await.unwrap();
        handler.create_post(draft("Design systems", Category::Design, false)).await.unwrap();
        handler.create_post(draft("Async Rust", Category::Development, false)).await.unwrap();
        handler
    }

    #[tokio::test]
    async fn list_falls_back_to_empty_when_store_is_down() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .returning(|_, _| Err(StoreError::Unavailable("connection refused".into())));

        let handler = PostHandler::new(store);
        assert!(handler.list_posts().await.is_empty());
    }

    #[tokio::test]
    async fn try_list_surfaces_store_errors() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .returning(|_, _| Err(StoreError::Unavailable("timeout".into())));

        let handler = PostHandler::new(store);
        assert!(matches!(handler.try_list_posts().await, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first() {
        let handler = seeded().await;
        let titles: Vec<String> = handler.list_posts().await.into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Async Rust", "Design systems", "Rust ownership"]);
    }

    #[tokio::test]
    async fn search_matches_title_or_excerpt_and_category() {
        let handler = seeded().await;

        let filter = PostFilter { q: Some("RUST".into()), category: Some("All".into()) };
        assert_eq!(handler.search_posts(&filter).await.len(), 2);

        let filter = PostFilter { q: None, category: Some("Design".into()) };
        let design = handler.search_posts(&filter).await;
        assert_eq!(design.len(), 1);
        assert_eq!(design[0].title, "Design systems");

        let filter = PostFilter { q: Some("about async".into()), category: None };
        assert_eq!(handler.search_posts(&filter).await.len(), 1);
    }

    #[tokio::test]
    async fn admin_filter_matches_category() {
        let handler = seeded().await;
        assert_eq!(handler.filter_admin_posts("develop").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_post_redirects_to_blog() {
        let handler = PostHandler::new(MemoryDocumentStore::new());
        match handler.get_post("does-not-exist").await {
            Err(AppError::MissingDocument { redirect, .. }) => assert_eq!(redirect, "/blog"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn related_posts_exclude_self() {
        let handler = seeded().await;
        let posts = handler.list_posts().await;
        let async_rust = posts.iter().find(|p| p.title == "Async Rust").unwrap();

        let related = handler.related_posts(async_rust).await;
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].title, "Rust ownership");
    }

    #[tokio::test]
    async fn update_changes_fields_and_keeps_created_at() {
        let handler = seeded().await;
        let created = handler.create_post(draft("Old title", Category::Career, false)).await.unwrap();
        let before = handler.get_post(&created.id).await.unwrap();

        let patch: UpdatePostRequest = serde_json::from_value(json!({"title": "New title"})).unwrap();
        let after = handler.update_post(&created.id, patch).await.unwrap();

        assert_eq!(after.title, "New title");
        assert_eq!(after.slug, "new-title");
        assert_eq!(after.excerpt, before.excerpt);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let handler = seeded().await;
        let created = handler.create_post(draft("Short lived", Category::Career, false)).await.unwrap();

        handler.delete_post(&created.id).await.unwrap();
        assert!(matches!(handler.delete_post(&created.id).await, Err(AppError::NotFound(_))));
        match handler.get_post(&created.id).await {
            Err(AppError::MissingDocument { redirect, .. }) => assert_eq!(redirect, "/blog"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn created_post_reads_back_as_drafted() {
        let handler = PostHandler::new(MemoryDocumentStore::new());
        let request = NewPostRequest {
            title: "Borrow checker field notes".into(),
            slug: Some("borrow-notes".into()),
            excerpt: "What the compiler taught me".into(),
            content: "Lifetimes are **descriptive**, not prescriptive.".into(),
            category: Category::Tutorials,
            image: Some("https://images.example.com/borrow.png".into()),
            read_time: Some("7 min read".into()),
            featured: true,
        };

        let created = handler.create_post(request.clone()).await.unwrap();
        assert_eq!(created.slug, "borrow-notes");

        let post = handler.get_post(&created.id).await.unwrap();
        assert_eq!(post.id, created.id);
        assert_eq!(post.title, request.title);
        assert_eq!(Some(post.slug), request.slug);
        assert_eq!(post.excerpt, request.excerpt);
        assert_eq!(post.content, request.content);
        assert_eq!(post.category, request.category);
        assert_eq!(post.image, request.image);
        assert_eq!(Some(post.read_time), request.read_time);
        assert_eq!(post.featured, request.featured);
        assert!(!post.date.is_empty());
        assert!(post.created_at.is_some());
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_store() {
        let mut store = MockStore::new();
        store.expect_add().never();

        let handler = PostHandler::new(store);
        let mut bad = draft("Valid", Category::Development, false);
        bad.content = String::new();

        assert!(matches!(handler.create_post(bad).await, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn stats_count_featured_posts() {
        let handler = seeded().await;
        assert_eq!(handler.post_stats().await.unwrap(), PostStats { total: 3, featured: 1 });
    }
}
