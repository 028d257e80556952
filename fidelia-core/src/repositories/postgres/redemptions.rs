// File: fidelia-core/src/repositories/postgres/redemptions.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use fidelia_common::error::Error;
use fidelia_common::models::redemption::{Redemption, RedemptionStatus};
use fidelia_common::traits::repository_traits::RedemptionRepository;

const REDEMPTION_COLUMNS: &str = r#"
    redemption_id, benefit_id, benefit_title,
    member_id, member_name, member_email,
    business_id, business_name,
    association_id, association_name,
    redeemed_at, discount_applied, original_amount, final_amount, status
"#;

#[derive(Clone)]
pub struct PostgresRedemptionRepository {
    pool: Pool<Postgres>,
}

impl PostgresRedemptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn redemption_from_row(row: &PgRow) -> Result<Redemption, Error> {
        let status_str: String = row.try_get("status")?;
        Ok(Redemption {
            redemption_id: row.try_get("redemption_id")?,
            benefit_id: row.try_get("benefit_id")?,
            benefit_title: row.try_get("benefit_title")?,
            member_id: row.try_get("member_id")?,
            member_name: row.try_get("member_name")?,
            member_email: row.try_get("member_email")?,
            business_id: row.try_get("business_id")?,
            business_name: row.try_get("business_name")?,
            association_id: row.try_get("association_id")?,
            association_name: row.try_get("association_name")?,
            redeemed_at: row.try_get("redeemed_at")?,
            discount_applied: row.try_get("discount_applied")?,
            original_amount: row.try_get("original_amount")?,
            final_amount: row.try_get("final_amount")?,
            status: RedemptionStatus::parse(&status_str)?,
        })
    }
}

#[async_trait]
impl RedemptionRepository for PostgresRedemptionRepository {
    async fn insert_redemption(&self, r: &Redemption) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO redemptions (
                redemption_id, benefit_id, benefit_title,
                member_id, member_name, member_email,
                business_id, business_name,
                association_id, association_name,
                redeemed_at, discount_applied, original_amount, final_amount, status
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
            "#,
        )
        .bind(r.redemption_id)
        .bind(r.benefit_id)
        .bind(&r.benefit_title)
        .bind(r.member_id)
        .bind(&r.member_name)
        .bind(&r.member_email)
        .bind(r.business_id)
        .bind(&r.business_name)
        .bind(r.association_id)
        .bind(&r.association_name)
        .bind(r.redeemed_at)
        .bind(r.discount_applied)
        .bind(r.original_amount)
        .bind(r.final_amount)
        .bind(r.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_member(&self, member_id: Uuid, limit: i64) -> Result<Vec<Redemption>, Error> {
        let sql = format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions
             WHERE member_id = $1
             ORDER BY redeemed_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(member_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::redemption_from_row).collect()
    }

    async fn list_for_business(&self, business_id: Uuid, limit: i64) -> Result<Vec<Redemption>, Error> {
        let sql = format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions
             WHERE business_id = $1
             ORDER BY redeemed_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(business_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::redemption_from_row).collect()
    }

    async fn list_all(&self, limit: i64) -> Result<Vec<Redemption>, Error> {
        let sql = format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions
             ORDER BY redeemed_at DESC
             LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::redemption_from_row).collect()
    }

    async fn list_since(&self, since: DateTime<Utc>, limit: i64) -> Result<Vec<Redemption>, Error> {
        let sql = format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions
             WHERE redeemed_at >= $1
             ORDER BY redeemed_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::redemption_from_row).collect()
    }

    async fn count_used_for_member(&self, benefit_id: Uuid, member_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS used_count
            FROM redemptions
            WHERE benefit_id = $1
              AND member_id = $2
              AND status = 'used'
            "#,
        )
        .bind(benefit_id)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("used_count")?)
    }
}
