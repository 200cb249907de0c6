pub mod auth;
pub mod blog;
pub mod pages;
