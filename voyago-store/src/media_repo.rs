use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use voyago_core::media::{NewImage, ServiceImage};
use voyago_core::repository::ImageRepository;
use voyago_core::StoreResult;

use crate::database::map_db_err;

pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const IMAGE_COLUMNS: &str = "id, service_id, image_url, alt_text, sort_order, is_primary, created_at";

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: i64,
    service_id: i64,
    image_url: String,
    alt_text: Option<String>,
    sort_order: i32,
    is_primary: bool,
    created_at: DateTime<Utc>,
}

impl ImageRow {
    fn into_image(self) -> ServiceImage {
        ServiceImage {
            id: self.id,
            service_id: self.service_id,
            image_url: self.image_url,
            alt_text: self.alt_text,
            sort_order: self.sort_order,
            is_primary: self.is_primary,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    async fn add(&self, service_id: i64, input: NewImage) -> StoreResult<ServiceImage> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        // A new primary displaces the old one.
        if input.is_primary {
            sqlx::query("UPDATE service_images SET is_primary = FALSE WHERE service_id = $1")
                .bind(service_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        let row: ImageRow = sqlx::query_as(&format!(
            "INSERT INTO service_images (service_id, image_url, alt_text, sort_order, is_primary) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            IMAGE_COLUMNS
        ))
        .bind(service_id)
        .bind(&input.image_url)
        .bind(input.alt_text.as_deref())
        .bind(input.sort_order.unwrap_or(0))
        .bind(input.is_primary)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(row.into_image())
    }

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<ServiceImage>> {
        let rows: Vec<ImageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM service_images WHERE service_id = $1 ORDER BY sort_order, id",
            IMAGE_COLUMNS
        ))
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(ImageRow::into_image).collect())
    }

    async fn set_primary(&self, id: i64) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let service_id: Option<i64> =
            sqlx::query_scalar("SELECT service_id FROM service_images WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;

        let Some(service_id) = service_id else {
            return Ok(false);
        };

        sqlx::query("UPDATE service_images SET is_primary = FALSE WHERE service_id = $1")
            .bind(service_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        sqlx::query("UPDATE service_images SET is_primary = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;

        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<Option<String>> {
        let url: Option<String> =
            sqlx::query_scalar("DELETE FROM service_images WHERE id = $1 RETURNING image_url")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(url)
    }
}
