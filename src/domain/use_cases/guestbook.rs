use validator::Validate;

use crate::{
    entities::{
        guestbook::{GuestbookEntry, NewGuestbookEntry, GUESTBOOK},
        token::Identity,
    },
    errors::AppError,
    repositories::document_store::{decode_documents, Direction, DocumentStore, Query, CREATED_AT},
};

pub struct GuestbookHandler<S>
where
    S: DocumentStore,
{
    pub store: S,
    pub page_size: usize,
}

impl<S> GuestbookHandler<S>
where
    S: DocumentStore,
{
    pub fn new(store: S, page_size: usize) -> Self {
        GuestbookHandler { store, page_size }
    }

    /// Newest entries first, at most `limit` (capped at the page size).
    pub async fn list_entries(&self, limit: Option<usize>) -> Vec<GuestbookEntry> {
        let limit = limit.unwrap_or(self.page_size).clamp(1, self.page_size.max(1));
        let query = Query::new()
            .order_by(CREATED_AT, Direction::Descending)
            .limit(limit);

        match self.store.query(GUESTBOOK, &query).await {
            Ok(docs) => decode_documents(GUESTBOOK, docs),
            Err(e) => {
                tracing::warn!("Listing guestbook failed, serving none: {}", e);
                Vec::new()
            }
        }
    }

    /// Appends an entry signed by `identity`.
    pub async fn sign(&self, identity: &Identity, entry: NewGuestbookEntry) -> Result<GuestbookEntry, AppError> {
        entry.validate()?;

        let id = self.store.add(GUESTBOOK, entry.into_document(identity)).await?;
        tracing::info!(entry_id = %id, uid = %identity.uid, "Guestbook signed");

        let doc = self
            .store
            .get(GUESTBOOK, &id)
            .await?
            .ok_or_else(|| AppError::InternalError("Guestbook entry vanished after write".into()))?;
        Ok(GuestbookEntry::try_from(doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::guestbook::Emoji,
        errors::StoreError,
        repositories::{document_store::mocks::MockStore, memory_store::MemoryDocumentStore},
    };

    fn visitor(uid: &str) -> Identity {
        Identity {
            uid: uid.to_string(),
            email: None,
            name: Some(format!("Visitor {uid}")),
            picture: None,
            admin: false,
        }
    }

    fn entry(message: &str) -> NewGuestbookEntry {
        NewGuestbookEntry {
            name: None,
            message: message.to_string(),
            emoji: Emoji::Party,
        }
    }

    #[tokio::test]
    async fn signing_stamps_the_entry() {
        let handler = GuestbookHandler::new(MemoryDocumentStore::new(), 50);
        let signed = handler.sign(&visitor("u1"), entry("Great work!")).await.unwrap();

        assert_eq!(signed.name, "Visitor u1");
        assert_eq!(signed.uid, "u1");
        assert_eq!(signed.emoji, Emoji::Party);
        assert!(signed.timestamp.is_some());
    }

    #[tokio::test]
    async fn entries_are_newest_first_and_capped() {
        let handler = GuestbookHandler::new(MemoryDocumentStore::new(), 2);
        for n in 1..=3 {
            handler.sign(&visitor("u"), entry(&format!("message {n}"))).await.unwrap();
        }

        let listed = handler.list_entries(Some(10)).await;
        let messages: Vec<&str> = listed.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["message 3", "message 2"]);
    }

    #[tokio::test]
    async fn overridden_name_wins() {
        let handler = GuestbookHandler::new(MemoryDocumentStore::new(), 50);
        let mut custom = entry("Hello");
        custom.name = Some("  Grace  ".into());

        let signed = handler.sign(&visitor("u2"), custom).await.unwrap();
        assert_eq!(signed.name, "Grace");
    }

    #[tokio::test]
    async fn store_outage_lists_nothing() {
        let mut store = MockStore::new();
        store
            .expect_query()
            .returning(|_, _| Err(StoreError::Unavailable("offline".into())));

        let handler = GuestbookHandler::new(store, 50);
        assert!(handler.list_entries(None).await.is_empty());
    }
}
