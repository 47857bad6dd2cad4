use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::visitmodel::{PropertyVisit, VisitStatus};

#[async_trait]
pub trait VisitExt {
    async fn create_visit(
        &self,
        property_id: Uuid,
        customer_id: Uuid,
        owner_id: Uuid,
        requested_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<PropertyVisit, Error>;

    async fn get_visit_by_id(&self, visit_id: Uuid) -> Result<Option<PropertyVisit>, Error>;

    async fn get_visits_by_customer(&self, customer_id: Uuid)
        -> Result<Vec<PropertyVisit>, Error>;

    async fn get_visits_by_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyVisit>, Error>;

    async fn update_visit_status(
        &self,
        visit_id: Uuid,
        status: VisitStatus,
    ) -> Result<PropertyVisit, Error>;
}

const VISIT_COLUMNS: &str = "id, property_id, customer_id, owner_id, requested_at, status, \
     note, created_at, updated_at";

#[async_trait]
impl VisitExt for DBClient {
    async fn create_visit(
        &self,
        property_id: Uuid,
        customer_id: Uuid,
        owner_id: Uuid,
        requested_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<PropertyVisit, Error> {
        let visit = sqlx::query_as::<_, PropertyVisit>(&format!(
            r#"
            INSERT INTO property_visits
            (property_id, customer_id, owner_id, requested_at, status, note)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING {VISIT_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(customer_id)
        .bind(owner_id)
        .bind(requested_at)
        .bind(note)
        .fetch_one(&self.pool)
        .await?;

        Ok(visit)
    }

    async fn get_visit_by_id(&self, visit_id: Uuid) -> Result<Option<PropertyVisit>, Error> {
        let visit = sqlx::query_as::<_, PropertyVisit>(&format!(
            "SELECT {VISIT_COLUMNS} FROM property_visits WHERE id = $1"
        ))
        .bind(visit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(visit)
    }

    async fn get_visits_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<PropertyVisit>, Error> {
        let visits = sqlx::query_as::<_, PropertyVisit>(&format!(
            r#"
            SELECT {VISIT_COLUMNS} FROM property_visits
            WHERE customer_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    async fn get_visits_by_owner(&self, owner_id: Uuid) -> Result<Vec<PropertyVisit>, Error> {
        let visits = sqlx::query_as::<_, PropertyVisit>(&format!(
            r#"
            SELECT {VISIT_COLUMNS} FROM property_visits
            WHERE owner_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }

    async fn update_visit_status(
        &self,
        visit_id: Uuid,
        status: VisitStatus,
    ) -> Result<PropertyVisit, Error> {
        let visit = sqlx::query_as::<_, PropertyVisit>(&format!(
            r#"
            UPDATE property_visits
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {VISIT_COLUMNS}
            "#
        ))
        .bind(visit_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(visit)
    }
}
