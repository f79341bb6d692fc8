use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        option_fields::OptionField,
        validation::{
            validate_optional_slug, validate_optional_title, validate_optional_url_field,
            validate_slug, validate_tags, validate_title, validate_url, MAX_EXCERPT_LENGTH,
            MAX_SLUG_LENGTH, MAX_TITLE_LENGTH, MIN_SLUG_LENGTH, MIN_TITLE_LENGTH,
        },
    },
    errors::StoreError,
    repositories::document_store::{Document, CREATED_AT, UPDATED_AT},
    utils::text::{parse_tags, slugify},
};

pub const PROJECTS: &str = "projects";
pub const SELECTED_WORK: &str = "selectedWork";
const LEGACY_FEATURED: &str = "featured";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Maintenance,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Maintenance => "Maintenance",
        }
    }

    pub fn parse(label: &str) -> Option<ProjectStatus> {
        [ProjectStatus::InProgress, ProjectStatus::Completed, ProjectStatus::Maintenance]
            .into_iter()
            .find(|s| s.as_str() == label)
    }
}

/// Tags arrive either as a list or as the admin form's comma-separated text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::Csv(text) => parse_tags(&text),
            TagsInput::List(list) => list
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

impl Default for TagsInput {
    fn default() -> Self {
        TagsInput::List(Vec::new())
    }
}

fn validate_tags_input(input: &TagsInput) -> Result<(), ValidationError> {
    validate_tags(&input.clone().into_tags())
}

fn validate_optional_tags(input: &OptionField<TagsInput>) -> Result<(), ValidationError> {
    match input {
        OptionField::SetToValue(tags) => validate_tags_input(tags),
        _ => Ok(()),
    }
}

// ───── Stored document ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectDocument {
    title: Option<String>,
    slug: Option<String>,
    excerpt: Option<String>,
    content: Option<String>,
    image: Option<String>,
    github_url: Option<String>,
    demo_url: Option<String>,
    tags: Option<Vec<String>>,
    status: Option<String>,
    selected_work: Option<bool>,
    featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub tags: Vec<String>,
    pub status: ProjectStatus,
    pub selected_work: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<Document> for Project {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let created_at = doc.timestamp(CREATED_AT);
        let updated_at = doc.timestamp(UPDATED_AT);
        let raw: ProjectDocument = serde_json::from_value(Value::Object(doc.data))
            .map_err(|e| StoreError::Malformed(format!("project {}: {}", doc.id, e)))?;

        let title = raw.title.unwrap_or_default();
        let status = raw
            .status
            .as_deref()
            .and_then(ProjectStatus::parse)
            .unwrap_or_default();

        Ok(Project {
            slug: raw.slug.filter(|s| !s.is_empty()).unwrap_or_else(|| slugify(&title)),
            id: doc.id,
            title,
            excerpt: raw.excerpt.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            image: raw.image.filter(|s| !s.is_empty()),
            github_url: raw.github_url.filter(|s| !s.is_empty()),
            demo_url: raw.demo_url.filter(|s| !s.is_empty()),
            tags: raw.tags.unwrap_or_default(),
            status,
            selected_work: raw.selected_work.or(raw.featured).unwrap_or(false),
            created_at,
            updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectCreatedResponse {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub selected_work: usize,
    pub completed: usize,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectRequest {
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

    #[serde(default)]
    pub content: String,

    #[validate(custom(function = "validate_url"))]
    pub image: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub github_url: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub demo_url: Option<String>,

    #[validate(custom(function = "validate_tags_input"))]
    #[serde(default)]
    pub tags: TagsInput,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default, alias = "featured")]
    pub selected_work: bool,
}

impl NewProjectRequest {
    pub fn into_document(self) -> Map<String, Value> {
        let slug = self
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&self.title));
        let tags = self.tags.into_tags();

        let mut data = Map::new();
        data.insert("title".into(), Value::String(self.title));
        data.insert("slug".into(), Value::String(slug));
        data.insert("excerpt".into(), Value::String(self.excerpt));
        data.insert("content".into(), Value::String(self.content));
        data.insert("image".into(), self.image.map_or(Value::Null, Value::String));
        data.insert("githubUrl".into(), self.github_url.map_or(Value::Null, Value::String));
        data.insert("demoUrl".into(), self.demo_url.map_or(Value::Null, Value::String));
        data.insert("tags".into(), Value::from(tags));
        data.insert("status".into(), Value::String(self.status.as_str().into()));
        data.insert(SELECTED_WORK.into(), Value::Bool(self.selected_work));
        data
    }
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProjectRequest {
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

    pub content: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub image: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub github_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub demo_url: OptionField<String>,

    #[validate(custom(function = "validate_optional_tags"))]
    pub tags: OptionField<TagsInput>,

    pub status: OptionField<ProjectStatus>,

    #[serde(alias = "featured")]
    pub selected_work: OptionField<bool>,
}

impl UpdateProjectRequest {
    /// Document patch for this update. Clearing `tags` stores an empty list;
    /// a changed title without an explicit slug regenerates the slug.
    pub fn into_patch(self) -> Map<String, Value> {
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

        match self.tags {
            OptionField::Unchanged => {}
            OptionField::SetToNull => {
                patch.insert("tags".into(), Value::Array(Vec::new()));
            }
            OptionField::SetToValue(tags) => {
                patch.insert("tags".into(), Value::from(tags.into_tags()));
            }
        }

        self.title.write_into(&mut patch, "title");
        self.excerpt.write_into(&mut patch, "excerpt");
        self.content.write_into(&mut patch, "content");
        self.image.write_into(&mut patch, "image");
        self.github_url.write_into(&mut patch, "githubUrl");
        self.demo_url.write_into(&mut patch, "demoUrl");
        self.status.write_into(&mut patch, "status");

        match self.selected_work {
            OptionField::Unchanged => {}
            OptionField::SetToNull => {
                patch.insert(SELECTED_WORK.into(), Value::Bool(false));
            }
            OptionField::SetToValue(selected) => {
                patch.insert(SELECTED_WORK.into(), Value::Bool(selected));
            }
        }
        patch
    }
}

/// Documents written before `selectedWork` existed only carry `featured`.
pub fn is_legacy_selected(data: &Map<String, Value>) -> bool {
    !data.contains_key(SELECTED_WORK) && data.get(LEGACY_FEATURED) == Some(&Value::Bool(true))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    pub q: Option<String>,
    pub status: Option<ProjectStatus>,
}
