use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    entities::{
        option_fields::OptionField,
        validation::{
            validate_optional_content, validate_optional_slug, validate_optional_title, validate_optional_url_field,
            validate_slug, validate_title, validate_url, MAX_EXCERPT_LENGTH, MAX_SLUG_LENGTH,
            MAX_TITLE_LENGTH, MIN_SLUG_LENGTH, MIN_TITLE_LENGTH,
        },
    },
    errors::StoreError,
    repositories::document_store::{Document, CREATED_AT, UPDATED_AT},
    utils::{markdown::safe_markdown_to_html, text::{display_date, read_time, slugify}},
};

pub const POSTS: &str = "posts";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Development,
    Design,
    Career,
    Tutorials,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Development,
        Category::Design,
        Category::Career,
        Category::Tutorials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Development => "Development",
            Category::Design => "Design",
            Category::Career => "Career",
            Category::Tutorials => "Tutorials",
        }
    }

    /// Exact label match; `None` for anything outside the fixed set.
    pub fn parse(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

// ───── Stored document ─────────────────────────────────────────────

/// Raw shape of a `posts` document. Every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PostDocument {
    title: Option<String>,
    slug: Option<String>,
    excerpt: Option<String>,
    content: Option<String>,
    category: Option<String>,
    image: Option<String>,
    date: Option<String>,
    read_time: Option<String>,
    featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: Category,
    pub image: Option<String>,
    pub date: String,
    pub read_time: String,
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<Document> for Post {
    type Error = StoreError;

    /// Resolves missing or unexpected fields to their defaults.
    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let created_at = doc.timestamp(CREATED_AT);
        let updated_at = doc.timestamp(UPDATED_AT);
        let raw: PostDocument = serde_json::from_value(Value::Object(doc.data))
            .map_err(|e| StoreError::Malformed(format!("post {}: {}", doc.id, e)))?;

        let title = raw.title.unwrap_or_default();
        let content = raw.content.unwrap_or_default();
        let category = match raw.category.as_deref() {
            None => Category::default(),
            Some(label) => Category::parse(label).unwrap_or_else(|| {
                tracing::warn!(post_id = %doc.id, category = label, "Unknown post category");
                Category::default()
            }),
        };

        Ok(Post {
            slug: raw.slug.filter(|s| !s.is_empty()).unwrap_or_else(|| slugify(&title)),
            read_time: raw.read_time.filter(|r| !r.is_empty()).unwrap_or_else(|| read_time(&content)),
            date: raw.date.unwrap_or_else(|| created_at.map(display_date).unwrap_or_default()),
            id: doc.id,
            title,
            excerpt: raw.excerpt.unwrap_or_default(),
            content,
            category,
            image: raw.image.filter(|i| !i.is_empty()),
            featured: raw.featured.unwrap_or(false),
            created_at,
            updated_at,
        })
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: Post,
    pub content_html: String,
}

#[derive(Debug, Serialize)]
pub struct PostCreatedResponse {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct PostStats {
    pub total: usize,
    pub featured: usize,
}

impl Post {
    pub fn to_detail_response(self) -> PostDetailResponse {
        let content_html = safe_markdown_to_html(&self.content);
        PostDetailResponse { post: self, content_html }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPostRequest {
    #[validate(
        length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH),
        custom(function = "validate_title")
    )]
    pub title: String,

    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,

    #[validate(length(max = MAX_EXCERPT_LENGTH))]
    #[serde(default)]
    pub excerpt: String,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,

    #[serde(default)]
    pub category: Category,

    #[validate(custom(function = "validate_url"))]
    pub image: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub read_time: Option<String>,

    #[serde(default)]
    pub featured: bool,
}

impl NewPostRequest {
    /// Document fields for a new post. Timestamps are left to the store.
    pub fn into_document(self, now: DateTime<Utc>) -> Map<String, Value> {
        let slug = self
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&self.title));
        let read_time = self.read_time.unwrap_or_else(|| read_time(&self.content));

        let mut data = Map::new();
        data.insert("title".into(), Value::String(self.title));
        data.insert("slug".into(), Value::String(slug));
        data.insert("excerpt".into(), Value::String(self.excerpt));
        data.insert("content".into(), Value::String(self.content));
        data.insert("category".into(), Value::String(self.category.as_str().into()));
        data.insert("image".into(), self.image.map_or(Value::Null, Value::String));
        data.insert("date".into(), Value::String(display_date(now)));
        data.insert("readTime".into(), Value::String(read_time));
        data.insert("featured".into(), Value::Bool(self.featured));
        data
    }
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(
        length(min = MIN_TITLE_LENGTH, max = MAX_TITLE_LENGTH),
        custom(function = "validate_optional_title")
    )]
    pub title: OptionField<String>,

    #[validate(
        length(max = MAX_SLUG_LENGTH),
        custom(function = "validate_optional_slug")
    )]
    pub slug: OptionField<String>,

    #[validate(length(max = MAX_EXCERPT_LENGTH))]
    pub excerpt: OptionField<String>,

    #[validate(
        length(min = 1, message = "Content cannot be empty"),
        custom(function = "validate_optional_content")
    )]
    pub content: OptionField<String>,

    pub category: OptionField<Category>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub image: OptionField<String>,

    #[validate(length(max = 30))]
    pub read_time: OptionField<String>,

    pub featured: OptionField<bool>,
}

impl UpdatePostRequest {
    /// Document patch for this update. Every save restamps `date`; a new
    /// title without an explicit slug regenerates the slug, and new content
    /// without an explicit read time recomputes it.
    pub fn into_patch(self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut patch = Map::new();

        match (&self.slug, &self.title) {
            (OptionField::SetToValue(slug), _) if !slug.is_empty() => {
                patch.insert("slug".into(), Value::String(slug.clone()));
            }
            (_, OptionField::SetToValue(title)) => {
                patch.insert("slug".into(), Value::String(slugify(title)));
            }
            _ => {}
        }

        match (&self.read_time, &self.content) {
            (OptionField::SetToValue(rt), _) if !rt.is_empty() => {
                patch.insert("readTime".into(), Value::String(rt.clone()));
            }
            (_, OptionField::SetToValue(content)) => {
                patch.insert("readTime".into(), Value::String(read_time(content)));
            }
            _ => {}
        }

        self.title.write_into(&mut patch, "title");
        self.excerpt.write_into(&mut patch, "excerpt");
        self.content.write_into(&mut patch, "content");
        self.category.write_into(&mut patch, "category");
        self.image.write_into(&mut patch, "image");
        self.featured.write_into(&mut patch, "featured");
        patch.insert("date".into(), Value::String(display_date(now)));
        patch
    }
}

/// Public blog list filter: `category` of `None` or `"All"` disables the
/// category match.
#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub q: Option<String>,
    pub category: Option<String>,
}
