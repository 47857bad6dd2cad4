use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    dtos::propertydtos::{CreatePropertyDto, UpdatePropertyDto},
    models::propertymodel::{Property, PropertyStatus, PropertyType},
};

#[derive(Debug, Default)]
pub struct PropertySearchFilters {
    pub city: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
    pub bedrooms: Option<i32>,
}

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        owner_id: Uuid,
        property_data: CreatePropertyDto,
    ) -> Result<Property, Error>;

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, Error>;

    async fn get_properties_by_owner(
        &self,
        owner_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, Error>;

    async fn search_approved_properties(
        &self,
        filters: PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, Error>;

    async fn get_pending_properties(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, Error>;

    async fn update_property(
        &self,
        property_id: Uuid,
        owner_id: Uuid,
        update: UpdatePropertyDto,
    ) -> Result<Option<Property>, Error>;

    async fn update_property_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, Error>;
}

const PROPERTY_COLUMNS: &str = "id, owner_id, title, description, address, city, property_type, \
     bedrooms, bathrooms, rent_amount, security_deposit, status, is_available, created_at, updated_at";

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        owner_id: Uuid,
        property_data: CreatePropertyDto,
    ) -> Result<Property, Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties
            (owner_id, title, description, address, city, property_type,
             bedrooms, bathrooms, rent_amount, security_deposit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(property_data.title)
        .bind(property_data.description)
        .bind(property_data.address)
        .bind(property_data.city)
        .bind(property_data.property_type)
        .bind(property_data.bedrooms)
        .bind(property_data.bathrooms)
        .bind(property_data.rent_amount)
        .bind(property_data.security_deposit)
        .fetch_one(&self.pool)
        .await?;

        Ok(property)
    }

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    async fn get_properties_by_owner(
        &self,
        owner_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let properties = sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn search_approved_properties(
        &self,
        filters: PropertySearchFilters,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let properties = sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE status = 'approved'
              AND is_available = TRUE
              AND ($1::VARCHAR IS NULL OR city ILIKE $1)
              AND ($2::property_type IS NULL OR property_type = $2)
              AND ($3::BIGINT IS NULL OR rent_amount >= $3)
              AND ($4::BIGINT IS NULL OR rent_amount <= $4)
              AND ($5::INT IS NULL OR bedrooms >= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(filters.city)
        .bind(filters.property_type)
        .bind(filters.min_rent)
        .bind(filters.max_rent)
        .bind(filters.bedrooms)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn get_pending_properties(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Property>, Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let properties = sqlx::query_as::<_, Property>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS} FROM properties
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn update_property(
        &self,
        property_id: Uuid,
        owner_id: Uuid,
        update: UpdatePropertyDto,
    ) -> Result<Option<Property>, Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                rent_amount = COALESCE($5, rent_amount),
                security_deposit = COALESCE($6, security_deposit),
                is_available = COALESCE($7, is_available),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(owner_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.rent_amount)
        .bind(update.security_deposit)
        .bind(update.is_available)
        .fetch_optional(&self.pool)
        .await?;

        Ok(property)
    }

    async fn update_property_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, Error> {
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(property)
    }
}
