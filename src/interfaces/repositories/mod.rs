pub mod document_store;
pub mod memory_store;
pub mod pg_store;
pub mod identity;
pub mod relay;
pub mod token;
