pub mod entities;
pub mod session;
pub mod use_cases;
