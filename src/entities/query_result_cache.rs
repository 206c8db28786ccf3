use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "query_result_cache")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// SHA-256 fingerprint of the normalized search request
    #[sea_orm(unique)]
    pub query_key: String,

    /// Page the row was created for; never changes afterwards
    pub page: i32,

    /// JSON array of normalized items, NULL until first populated
    #[sea_orm(column_type = "Text", nullable)]
    pub results: Option<String>,

    /// RFC 3339 timestamp of the last successful refresh
    pub last_queried_at: Option<String>,

    pub total_pages: Option<i32>,

    pub total_results: Option<i64>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
