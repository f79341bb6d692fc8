pub mod admin;
pub mod auth;
pub mod contact;
pub mod guestbook;
pub mod home;
pub mod posts;
pub mod projects;
pub mod system;
