//! Schema bootstrap for the lead store.
//!
//! There is no migration history: the single table is created with
//! `IF NOT EXISTS` so that [`initialize`] can run on every startup.

use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use tracing::{error, info};

use crate::errors::ServiceError;

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    LastName,
    Company,
    Status,
}

fn create_lead_table() -> TableCreateStatement {
    Table::create()
        .table(Lead::Table)
        .if_not_exists()
        // AUTOINCREMENT on SQLite keeps ids from being reused after a delete
        .col(
            ColumnDef::new(Lead::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Lead::LastName).string().not_null())
        .col(ColumnDef::new(Lead::Company).string().not_null())
        .col(
            ColumnDef::new(Lead::Status)
                .string()
                .not_null()
                .default("New"),
        )
        .to_owned()
}

/// Ensures the `lead` table exists. Safe to call repeatedly.
pub async fn initialize(db: &DatabaseConnection) -> Result<(), ServiceError> {
    let manager = SchemaManager::new(db);
    let start = std::time::Instant::now();

    let existed = manager.has_table("lead").await.map_err(|e| {
        error!("Failed to inspect schema: {}", e);
        ServiceError::DatabaseError(e)
    })?;

    manager.create_table(create_lead_table()).await.map_err(|e| {
        error!("Failed to create lead table: {}", e);
        ServiceError::DatabaseError(e)
    })?;

    if existed {
        info!("Lead table already present ({:?})", start.elapsed());
    } else {
        info!("Lead table created in {:?}", start.elapsed());
    }

    Ok(())
}
