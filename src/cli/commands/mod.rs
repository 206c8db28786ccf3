mod genres;
mod search;

pub use genres::cmd_sync_genres;
pub use search::{cmd_search, parse_pairs};
