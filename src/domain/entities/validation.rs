use std::borrow::Cow;

use validator::ValidationError;

use crate::entities::option_fields::OptionField;

pub const MIN_TITLE_LENGTH: u64 = 1;
pub const MAX_TITLE_LENGTH: u64 = 120;
pub const MIN_SLUG_LENGTH: u64 = 1;
pub const MAX_SLUG_LENGTH: u64 = 80;
pub const MAX_EXCERPT_LENGTH: u64 = 300;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LENGTH: usize = 40;

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(new_validation_error("slug_empty", "Slug cannot be empty"));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(new_validation_error("slug_invalid_chars", "Slug must contain only lowercase letters, digits, or hyphens"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(new_validation_error("slug_edge_hyphen", "Slug must not start or end with a hyphen"));
    }
    if slug.contains("--") {
        return Err(new_validation_error("slug_double_hyphen", "Slug must not contain consecutive hyphens"));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(new_validation_error("title_blank", "Title cannot be blank"));
    }
    if title.trim().len() != title.len() {
        return Err(new_validation_error("title_whitespace", "Title must not have leading or trailing whitespace"));
    }
    Ok(())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("blank", "Value cannot be blank"));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(new_validation_error("too_many_tags", "Too many tags provided"));
    }
    if tags.iter().any(|tag| tag.is_empty() || tag.chars().count() > MAX_TAG_LENGTH) {
        return Err(new_validation_error("invalid_tag_length", "Tag length must be within allowed range"));
    }
    Ok(())
}

pub fn validate_optional_title(value: &OptionField<String>) -> Result<(), ValidationError> {
    match value {
        OptionField::SetToValue(title) => validate_title(title),
        OptionField::SetToNull => Err(new_validation_error("title_null", "Title cannot be removed")),
        OptionField::Unchanged => Ok(()),
    }
}

pub fn validate_optional_content(value: &OptionField<String>) -> Result<(), ValidationError> {
    match value {
        OptionField::SetToValue(content) => validate_not_blank(content),
        OptionField::SetToNull => Err(new_validation_error("content_null", "Content cannot be removed")),
        OptionField::Unchanged => Ok(()),
    }
}

/// Empty string asks for a slug regenerated from the title.
pub fn validate_optional_slug(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(slug) = value {
        if !slug.is_empty() {
            validate_slug(slug)?;
        }
    }
    Ok(())
}

pub fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(url) = value {
        validate_url(url)?;
    }
    Ok(())
}

pub fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}
