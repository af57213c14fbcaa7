use super::QueryResult;
use crate::model::{PriceSnapshot, Table};
use chrono::{DateTime, Utc};
use sqlx::error::Error;

impl Table<PriceSnapshot> {
    pub async fn insert(&self, data: &PriceSnapshot) -> Result<QueryResult, Error> {
        sqlx::query(
            r#"
            INSERT INTO price_snapshot (
                external_id,
                symbol,
                name,
                price,
                market_cap,
                volume_24h,
                percent_change_1h,
                percent_change_24h,
                percent_change_7d,
                rank,
                observed_at
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(data.external_id)
        .bind(&data.symbol)
        .bind(&data.name)
        .bind(data.price)
        .bind(data.market_cap)
        .bind(data.volume_24h)
        .bind(data.percent_change_1h)
        .bind(data.percent_change_24h)
        .bind(data.percent_change_7d)
        .bind(data.rank)
        .bind(data.observed_at)
        .execute(&self.pool)
        .await
    }

    /// Latest snapshot per asset, ranked assets only, most prominent first.
    /// An asset is identified by its external id, falling back to the
    /// lower-cased symbol for rows that never came from the live source.
    pub async fn get_latest_ranked(
        &self,
        limit: i64,
    ) -> Result<Vec<PriceSnapshot>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM price_snapshot
            WHERE id IN (
                SELECT MAX(id) FROM price_snapshot
                GROUP BY COALESCE(CAST(external_id AS TEXT), LOWER(symbol))
            )
            AND rank IS NOT NULL
            ORDER BY rank ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_latest_by_symbol(
        &self,
        symbol: &str,
    ) -> Result<Option<PriceSnapshot>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM price_snapshot
            WHERE LOWER(symbol) = LOWER($1)
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
    }

    /// Case-insensitive substring match against name or symbol, restricted
    /// to the latest-per-asset set.
    pub async fn search_latest(
        &self,
        term: &str,
    ) -> Result<Vec<PriceSnapshot>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM price_snapshot
            WHERE id IN (
                SELECT MAX(id) FROM price_snapshot
                GROUP BY COALESCE(CAST(external_id AS TEXT), LOWER(symbol))
            )
            AND (name ILIKE '%' || $1 || '%' OR symbol ILIKE '%' || $1 || '%')
            ORDER BY rank ASC NULLS LAST
            "#,
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_history_by_symbol(
        &self,
        symbol: &str,
    ) -> Result<Vec<PriceSnapshot>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM price_snapshot
            WHERE LOWER(symbol) = LOWER($1)
            ORDER BY observed_at DESC
            "#,
        )
        .bind(symbol)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_history_by_external_id(
        &self,
        external_id: i64,
    ) -> Result<Vec<PriceSnapshot>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM price_snapshot
            WHERE external_id = $1
            ORDER BY observed_at DESC
            "#,
        )
        .bind(external_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM price_snapshot"#)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn prune_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM price_snapshot WHERE observed_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
