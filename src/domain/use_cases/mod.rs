pub mod auth;
pub mod contact;
pub mod extractors;
pub mod guestbook;
pub mod posts;
pub mod projects;
