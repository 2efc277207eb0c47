use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use voyago_core::availability::{Availability, NewAvailability};
use voyago_core::repository::AvailabilityRepository;
use voyago_core::StoreResult;

use crate::database::map_db_err;

pub struct PostgresAvailabilityRepository {
    pool: PgPool,
}

impl PostgresAvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const AVAILABILITY_COLUMNS: &str =
    "id, service_id, variant_id, starts_at, ends_at, total_capacity, booked_count, created_at";

#[derive(sqlx::FromRow)]
struct AvailabilityRow {
    id: i64,
    service_id: i64,
    variant_id: Option<i64>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    total_capacity: i32,
    booked_count: i32,
    created_at: DateTime<Utc>,
}

impl AvailabilityRow {
    fn into_availability(self) -> Availability {
        Availability {
            id: self.id,
            service_id: self.service_id,
            variant_id: self.variant_id,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            total_capacity: self.total_capacity,
            booked_count: self.booked_count,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresAvailabilityRepository {
    async fn create(&self, service_id: i64, input: NewAvailability) -> StoreResult<Availability> {
        let row: AvailabilityRow = sqlx::query_as(&format!(
            "INSERT INTO service_availabilities \
             (service_id, variant_id, starts_at, ends_at, total_capacity) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            AVAILABILITY_COLUMNS
        ))
        .bind(service_id)
        .bind(input.variant_id)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.total_capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(row.into_availability())
    }

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<Availability>> {
        let rows: Vec<AvailabilityRow> = sqlx::query_as(&format!(
            "SELECT {} FROM service_availabilities WHERE service_id = $1 ORDER BY starts_at",
            AVAILABILITY_COLUMNS
        ))
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(AvailabilityRow::into_availability).collect())
    }

    async fn reserve(&self, id: i64, quantity: i32) -> StoreResult<bool> {
        // The capacity guard lives in the UPDATE predicate; a full window
        // simply matches zero rows.
        let result = sqlx::query(
            "UPDATE service_availabilities \
             SET booked_count = booked_count + $2 \
             WHERE id = $1 AND booked_count + $2 <= total_capacity",
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, id: i64, quantity: i32) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE service_availabilities \
             SET booked_count = GREATEST(booked_count - $2, 0) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
