pub mod prelude;

pub mod genres;
pub mod query_result_cache;
