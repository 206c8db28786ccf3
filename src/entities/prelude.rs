pub use super::genres::Entity as Genres;
pub use super::query_result_cache::Entity as QueryResultCache;
