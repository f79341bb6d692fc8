use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    entities::{token::Identity, validation::validate_not_blank},
    errors::StoreError,
    repositories::document_store::{Document, CREATED_AT},
};

pub const GUESTBOOK: &str = "guestbook";
pub const MAX_MESSAGE_LENGTH: u64 = 500;

/// Reaction shown next to a guestbook entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emoji {
    #[default]
    Smile,
    Rocket,
    Laptop,
    Star,
    Fire,
    Idea,
    Party,
    Clap,
    Heart,
    Cpu,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GuestbookDocument {
    name: Option<String>,
    #[serde(rename = "photoURL")]
    photo_url: Option<String>,
    uid: Option<String>,
    message: Option<String>,
    emoji: Option<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GuestbookEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub uid: String,
    pub message: String,
    pub emoji: Emoji,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<Document> for GuestbookEntry {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let timestamp = doc.timestamp(CREATED_AT);
        let raw: GuestbookDocument = serde_json::from_value(Value::Object(doc.data))
            .map_err(|e| StoreError::Malformed(format!("guestbook entry {}: {}", doc.id, e)))?;

        // Unknown reactions fall back to the default rather than hiding the entry.
        let emoji = raw
            .emoji
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Ok(GuestbookEntry {
            id: doc.id,
            name: raw.name.unwrap_or_else(|| "Anonymous".to_string()),
            photo_url: raw.photo_url.filter(|p| !p.is_empty()),
            uid: raw.uid.unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
            emoji,
            timestamp,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewGuestbookEntry {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = MAX_MESSAGE_LENGTH), custom(function = "validate_not_blank"))]
    pub message: String,

    #[serde(default)]
    pub emoji: Emoji,
}

impl NewGuestbookEntry {
    /// The signer's display name comes from the session unless the form
    /// overrides it.
    pub fn into_document(self, identity: &Identity) -> Map<String, Value> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| identity.display_name());

        let mut data = Map::new();
        data.insert("name".into(), Value::String(name));
        data.insert(
            "photoURL".into(),
            identity.picture.clone().map_or(Value::Null, Value::String),
        );
        data.insert("uid".into(), Value::String(identity.uid.clone()));
        data.insert("message".into(), Value::String(self.message.trim().to_string()));
        data.insert("emoji".into(), serde_json::to_value(self.emoji).unwrap_or(Value::Null));
        data
    }
}

#[derive(Debug, Deserialize)]
pub struct GuestbookQuery {
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visitor() -> Identity {
        Identity {
            uid: "google-123".into(),
            email: Some("visitor@example.com".into()),
            name: Some("Ada Visitor".into()),
            picture: Some("https://example.com/ada.png".into()),
            admin: false,
        }
    }

    #[test]
    fn session_supplies_signer_details() {
        let entry: NewGuestbookEntry =
            serde_json::from_value(json!({"message": "  Lovely site  ", "emoji": "rocket"})).unwrap();

        let data = entry.into_document(&visitor());
        assert_eq!(data["name"], "Ada Visitor");
        assert_eq!(data["uid"], "google-123");
        assert_eq!(data["photoURL"], "https://example.com/ada.png");
        assert_eq!(data["message"], "Lovely site");
        assert_eq!(data["emoji"], "rocket");
    }

    #[test]
    fn blank_message_is_rejected() {
        let entry: NewGuestbookEntry = serde_json::from_value(json!({"message": "   "})).unwrap();
        assert!(entry.validate().is_err());
        assert_eq!(entry.emoji, Emoji::Smile);
    }

    #[test]
    fn unknown_emoji_in_store_falls_back() {
        let doc = Document::new(
            "g1",
            json!({"name": "Sam", "uid": "u1", "message": "hi", "emoji": "unicorn"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let entry = GuestbookEntry::try_from(doc).unwrap();
        assert_eq!(entry.emoji, Emoji::Smile);
        assert!(entry.photo_url.is_none());
    }
}
