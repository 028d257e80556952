// File: fidelia-core/src/repositories/postgres/benefits.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use fidelia_common::error::Error;
use fidelia_common::models::benefit::{AccessMode, Benefit, BenefitState, DiscountKind};
use fidelia_common::models::redemption::Redemption;
use fidelia_common::traits::repository_traits::{BenefitRepository, RedeemOutcome};

const BENEFIT_COLUMNS: &str = r#"
    benefit_id, title, description, discount_kind, discount_value,
    valid_from, valid_until, state, access_mode,
    business_id, business_name, business_logo_url, association_ids,
    max_redemptions, per_member_limit, usage_count,
    category, tags, featured, created_at, updated_at
"#;

#[derive(Clone)]
pub struct PostgresBenefitRepository {
    pool: Pool<Postgres>,
}

impl PostgresBenefitRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn benefit_from_row(row: &PgRow) -> Result<Benefit, Error> {
        let kind_str: String = row.try_get("discount_kind")?;
        let state_str: String = row.try_get("state")?;
        let mode_str: String = row.try_get("access_mode")?;
        Ok(Benefit {
            benefit_id: row.try_get("benefit_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            discount_kind: DiscountKind::parse(&kind_str)?,
            discount_value: row.try_get("discount_value")?,
            valid_from: row.try_get("valid_from")?,
            valid_until: row.try_get("valid_until")?,
            state: BenefitState::parse(&state_str)?,
            access_mode: AccessMode::parse(&mode_str)?,
            business_id: row.try_get("business_id")?,
            business_name: row.try_get("business_name")?,
            business_logo_url: row.try_get("business_logo_url")?,
            association_ids: row.try_get("association_ids")?,
            max_redemptions: row.try_get("max_redemptions")?,
            per_member_limit: row.try_get("per_member_limit")?,
            usage_count: row.try_get("usage_count")?,
            category: row.try_get("category")?,
            tags: row.try_get("tags")?,
            featured: row.try_get("featured")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// The conditional increment matched zero rows; work out which typed
    /// rejection applies from the benefit's current state.
    async fn classify_redeem_rejection(&self, benefit_id: Uuid) -> Error {
        match self.get_benefit_by_id(benefit_id).await {
            Ok(None) => Error::NotFound(format!("benefit {benefit_id}")),
            Ok(Some(b)) if b.state == BenefitState::Exhausted => Error::QuotaExhausted,
            Ok(Some(b)) if b.state != BenefitState::Active => Error::NotActive,
            Ok(Some(_)) => Error::QuotaExhausted,
            Err(e) => e,
        }
    }
}

#[async_trait]
impl BenefitRepository for PostgresBenefitRepository {
    async fn create_benefit(&self, b: &Benefit) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO benefits (
                benefit_id, title, description, discount_kind, discount_value,
                valid_from, valid_until, state, access_mode,
                business_id, business_name, business_logo_url, association_ids,
                max_redemptions, per_member_limit, usage_count,
                category, tags, featured, created_at, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20,$21)
            "#,
        )
        .bind(b.benefit_id)
        .bind(&b.title)
        .bind(&b.description)
        .bind(b.discount_kind.as_str())
        .bind(b.discount_value)
        .bind(b.valid_from)
        .bind(b.valid_until)
        .bind(b.state.as_str())
        .bind(b.access_mode.as_str())
        .bind(b.business_id)
        .bind(&b.business_name)
        .bind(&b.business_logo_url)
        .bind(&b.association_ids)
        .bind(b.max_redemptions)
        .bind(b.per_member_limit)
        .bind(b.usage_count)
        .bind(&b.category)
        .bind(&b.tags)
        .bind(b.featured)
        .bind(b.created_at)
        .bind(b.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_benefit_by_id(&self, benefit_id: Uuid) -> Result<Option<Benefit>, Error> {
        let sql = format!("SELECT {BENEFIT_COLUMNS} FROM benefits WHERE benefit_id = $1");
        let row_opt = sqlx::query(&sql)
            .bind(benefit_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(row) => Ok(Some(Self::benefit_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_benefit(&self, b: &Benefit) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE benefits
            SET
              title = $1,
              description = $2,
              discount_kind = $3,
              discount_value = $4,
              valid_from = $5,
              valid_until = $6,
              state = $7,
              access_mode = $8,
              business_name = $9,
              business_logo_url = $10,
              association_ids = $11,
              max_redemptions = $12,
              per_member_limit = $13,
              category = $14,
              tags = $15,
              featured = $16,
              updated_at = $17
            WHERE benefit_id = $18
            "#,
        )
        .bind(&b.title)
        .bind(&b.description)
        .bind(b.discount_kind.as_str())
        .bind(b.discount_value)
        .bind(b.valid_from)
        .bind(b.valid_until)
        .bind(b.state.as_str())
        .bind(b.access_mode.as_str())
        .bind(&b.business_name)
        .bind(&b.business_logo_url)
        .bind(&b.association_ids)
        .bind(b.max_redemptions)
        .bind(b.per_member_limit)
        .bind(&b.category)
        .bind(&b.tags)
        .bind(b.featured)
        .bind(b.updated_at)
        .bind(b.benefit_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_benefit_state(&self, benefit_id: Uuid, state: BenefitState) -> Result<(), Error> {
        sqlx::query(
            "UPDATE benefits SET state = $1, updated_at = $2 WHERE benefit_id = $3",
        )
        .bind(state.as_str())
        .bind(Utc::now())
        .bind(benefit_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_access_mode(&self, mode: AccessMode, limit: i64) -> Result<Vec<Benefit>, Error> {
        let sql = format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits
             WHERE access_mode = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(mode.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::benefit_from_row).collect()
    }

    async fn list_for_association(&self, association_id: Uuid, limit: i64) -> Result<Vec<Benefit>, Error> {
        let sql = format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits
             WHERE access_mode = 'association_scoped'
               AND $1 = ANY(association_ids)
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(association_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::benefit_from_row).collect()
    }

    async fn list_for_businesses(&self, business_ids: &[Uuid], limit: i64) -> Result<Vec<Benefit>, Error> {
        if business_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits
             WHERE business_id = ANY($1)
             ORDER BY created_at DESC
             LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(business_ids)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::benefit_from_row).collect()
    }

    async fn list_active(&self, limit: i64) -> Result<Vec<Benefit>, Error> {
        let sql = format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits
             WHERE state = 'active'
             ORDER BY created_at DESC
             LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::benefit_from_row).collect()
    }

    async fn list_all(&self, limit: i64) -> Result<Vec<Benefit>, Error> {
        let sql = format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits
             ORDER BY created_at DESC
             LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::benefit_from_row).collect()
    }

    async fn list_for_owner(&self, business_id: Uuid) -> Result<Vec<Benefit>, Error> {
        let sql = format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits
             WHERE business_id = $1
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::benefit_from_row).collect()
    }

    async fn redeem_transaction(
        &self,
        benefit_id: Uuid,
        redemption: &Redemption,
    ) -> Result<RedeemOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        // Conditional increment: only applies while the benefit is active and
        // has quota headroom, so concurrent racers cannot over-spend.
        let row_opt = sqlx::query(
            r#"
            UPDATE benefits
            SET usage_count = usage_count + 1,
                updated_at = $2
            WHERE benefit_id = $1
              AND state = 'active'
              AND (max_redemptions IS NULL OR usage_count < max_redemptions)
            RETURNING usage_count, max_redemptions
            "#,
        )
        .bind(benefit_id)
        .bind(redemption.redeemed_at)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match row_opt {
            Some(r) => r,
            None => {
                tx.rollback().await?;
                return Err(self.classify_redeem_rejection(benefit_id).await);
            }
        };

        let usage_count: i32 = row.try_get("usage_count")?;
        let max_redemptions: Option<i32> = row.try_get("max_redemptions")?;
        let exhausted = matches!(max_redemptions, Some(max) if usage_count >= max);

        if exhausted {
            sqlx::query("UPDATE benefits SET state = 'exhausted' WHERE benefit_id = $1")
                .bind(benefit_id)
                .execute(&mut *tx)
                .await?;
        }

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
        .bind(redemption.redemption_id)
        .bind(redemption.benefit_id)
        .bind(&redemption.benefit_title)
        .bind(redemption.member_id)
        .bind(&redemption.member_name)
        .bind(&redemption.member_email)
        .bind(redemption.business_id)
        .bind(&redemption.business_name)
        .bind(redemption.association_id)
        .bind(&redemption.association_name)
        .bind(redemption.redeemed_at)
        .bind(redemption.discount_applied)
        .bind(redemption.original_amount)
        .bind(redemption.final_amount)
        .bind(redemption.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RedeemOutcome { usage_count, exhausted })
    }

    async fn mark_expired_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>, Error> {
        let rows = sqlx::query(
            r#"
            UPDATE benefits
            SET state = 'expired', updated_at = $1
            WHERE state = 'active'
              AND valid_until <= $1
            RETURNING benefit_id
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("benefit_id")?);
        }
        Ok(ids)
    }
}
