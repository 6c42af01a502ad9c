use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::CampusConfig;

pub mod migrator;

pub async fn open_or_create_db(config: &CampusConfig) -> Result<DatabaseConnection, DbErr> {
    Database::connect(config.connection_string()).await
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
