// File: fidelia-core/src/repositories/postgres/members.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use fidelia_common::error::Error;
use fidelia_common::models::member::Member;
use fidelia_common::traits::repository_traits::MemberRepository;

#[derive(Clone)]
pub struct PostgresMemberRepository {
    pool: Pool<Postgres>,
}

impl PostgresMemberRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn get_member_by_id(&self, member_id: Uuid) -> Result<Option<Member>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT member_id, name, email, association_id,
                   affiliated_business_ids, active
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row_opt {
            let m = Member {
                member_id: row.try_get("member_id")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                association_id: row.try_get("association_id")?,
                affiliated_business_ids: row.try_get("affiliated_business_ids")?,
                active: row.try_get("active")?,
            };
            Ok(Some(m))
        } else {
            Ok(None)
        }
    }
}
