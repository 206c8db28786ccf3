pub mod cache;
pub mod genre;
