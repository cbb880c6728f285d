use crate::{
    db::DbPool,
    entities::lead::{self, Entity as LeadEntity},
    errors::ServiceError,
    tracing::timed,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

pub const DEFAULT_LEAD_STATUS: &str = "New";

fn default_status() -> String {
    DEFAULT_LEAD_STATUS.to_string()
}

/// The caller-supplied fields of a lead. Any `id` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadInput {
    #[schema(example = "Lee")]
    pub last_name: String,
    #[schema(example = "Widgets")]
    pub company: String,
    #[serde(default = "default_status")]
    #[schema(example = "Contacted", default = "New")]
    pub status: String,
}

impl LeadInput {
    pub fn new(last_name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            company: company.into(),
            status: default_status(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// Storage handle for leads.
///
/// Every method borrows a connection from the pool for its own duration only.
#[derive(Clone)]
pub struct LeadService {
    db: Arc<DbPool>,
}

impl LeadService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Persists a new lead and returns it with its assigned id
    #[instrument(skip(self))]
    pub async fn insert(&self, input: LeadInput) -> Result<lead::Model, ServiceError> {
        let db = &*self.db;
        let created = timed("lead.insert", move || async move {
            lead::ActiveModel {
                id: NotSet,
                last_name: Set(input.last_name),
                company: Set(input.company),
                status: Set(input.status),
            }
            .insert(db)
            .await
            .map_err(ServiceError::DatabaseError)
        })
        .await?;

        info!(lead_id = created.id, "Lead created");
        Ok(created)
    }

    /// Lists every stored lead in id order
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<lead::Model>, ServiceError> {
        let db = &*self.db;
        timed("lead.get_all", move || async move {
            LeadEntity::find()
                .order_by_asc(lead::Column::Id)
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<lead::Model, ServiceError> {
        let db = &*self.db;
        timed("lead.get_by_id", move || async move {
            LeadEntity::find_by_id(id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(ServiceError::lead_not_found)
        })
        .await
    }

    /// Overwrites all three mutable fields of an existing lead.
    ///
    /// A single `UPDATE` statement, so concurrent writers to the same id
    /// serialize on the store and the last one to commit wins.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, input: LeadInput) -> Result<lead::Model, ServiceError> {
        let db = &*self.db;
        let values = input.clone();
        let result = timed("lead.update", move || async move {
            LeadEntity::update_many()
                .col_expr(lead::Column::LastName, Expr::value(values.last_name))
                .col_expr(lead::Column::Company, Expr::value(values.company))
                .col_expr(lead::Column::Status, Expr::value(values.status))
                .filter(lead::Column::Id.eq(id))
                .exec(db)
                .await
                .map_err(ServiceError::DatabaseError)
        })
        .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::lead_not_found());
        }

        info!(lead_id = id, "Lead updated");
        Ok(lead::Model {
            id,
            last_name: input.last_name,
            company: input.company,
            status: input.status,
        })
    }

    /// Hard-deletes a lead
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db;
        let result = timed("lead.delete_by_id", move || async move {
            LeadEntity::delete_by_id(id)
                .exec(db)
                .await
                .map_err(ServiceError::DatabaseError)
        })
        .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::lead_not_found());
        }

        info!(lead_id = id, "Lead deleted");
        Ok(())
    }
}
