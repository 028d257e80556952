// File: fidelia-core/src/repositories/postgres/businesses.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use fidelia_common::error::Error;
use fidelia_common::models::business::Business;
use fidelia_common::traits::repository_traits::BusinessRepository;

#[derive(Clone)]
pub struct PostgresBusinessRepository {
    pool: Pool<Postgres>,
}

impl PostgresBusinessRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepository for PostgresBusinessRepository {
    async fn get_business_by_id(&self, business_id: Uuid) -> Result<Option<Business>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT business_id, name, logo_url, association_ids
            FROM businesses
            WHERE business_id = $1
            "#,
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row_opt {
            let b = Business {
                business_id: row.try_get("business_id")?,
                name: row.try_get("name")?,
                logo_url: row.try_get("logo_url")?,
                association_ids: row.try_get("association_ids")?,
            };
            Ok(Some(b))
        } else {
            Ok(None)
        }
    }

    async fn list_ids_for_association(&self, association_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT business_id
            FROM businesses
            WHERE $1 = ANY(association_ids)
            ORDER BY name ASC
            "#,
        )
        .bind(association_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("business_id")?);
        }
        Ok(ids)
    }
}
