// entities/mod.rs
pub mod blog;
pub mod category;
pub mod user;
