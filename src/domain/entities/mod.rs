pub mod contact;
pub mod guestbook;
pub mod option_fields;
pub mod post;
pub mod project;
pub mod token;
pub mod validation;
