pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_core_tables;
mod m20250101_000002_create_typing_results_table;

/// Ordered schema history. Every entry is additive: new tables and indexes
/// only, never a drop or rename of something already shipped, so saved
/// profiles and games survive upgrades.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_core_tables::Migration),
            Box::new(m20250101_000002_create_typing_results_table::Migration),
        ]
    }
}

/// Schema version once every migration has been applied.
pub fn schema_version() -> usize {
    Migrator::migrations().len()
}
