pub mod discover;
pub mod genres;
pub mod search;

pub use discover::UpstreamSearchClient;
pub use genres::GenreService;
pub use search::{Pagination, SearchOutcome, SearchService};
