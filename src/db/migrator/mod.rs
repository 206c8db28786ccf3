use sea_orm_migration::prelude::*;

mod m20251208_create_genres;
mod m20251209_create_query_result_cache;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251208_create_genres::Migration),
            Box::new(m20251209_create_query_result_cache::Migration),
        ]
    }
}
