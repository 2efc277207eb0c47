use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use voyago_core::booking::{
    Booking, BookingItem, BookingStatus, NewBooking, NewPayment, Participant, Payment,
    PaymentStatus,
};
use voyago_core::repository::BookingRepository;
use voyago_core::{StoreError, StoreResult};

use crate::database::map_db_err;

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    booking_code: Uuid,
    customer_name: String,
    customer_email: String,
    status: String,
    total_minor: i64,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct BookingItemRow {
    id: i64,
    service_id: i64,
    variant_id: Option<i64>,
    availability_id: Option<i64>,
    quantity: i32,
    unit_price_minor: i64,
    currency: String,
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    id: i64,
    full_name: String,
    date_of_birth: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    booking_id: i64,
    provider: String,
    amount_minor: i64,
    currency: String,
    status: String,
    gateway_payload: Value,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create(&self, input: NewBooking) -> StoreResult<Booking> {
        let currency = input.currency.as_deref().unwrap_or("USD").to_string();
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        // 1. Resolve unit prices; items without an explicit price take the
        //    referenced variant's.
        let mut priced_items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let unit_price = match (item.unit_price_minor, item.variant_id) {
                (Some(price), _) => price,
                (None, Some(variant_id)) => {
                    let price: Option<i64> = sqlx::query_scalar(
                        "SELECT price_minor FROM service_variants WHERE id = $1",
                    )
                    .bind(variant_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_db_err)?;
                    price.ok_or_else(|| {
                        StoreError::Database("booking item references unknown variant".into())
                    })?
                }
                (None, None) => {
                    return Err(StoreError::Database(
                        "booking item carries neither price nor variant".into(),
                    ))
                }
            };
            priced_items.push((item, unit_price));
        }
        let total_minor: i64 = priced_items
            .iter()
            .map(|(item, price)| i64::from(item.quantity) * price)
            .sum();

        // 2. Booking row.
        let booking_code = Uuid::new_v4();
        let booking_id: i64 = sqlx::query_scalar(
            "INSERT INTO bookings (booking_code, customer_name, customer_email, total_minor, currency) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(booking_code)
        .bind(&input.customer_name)
        .bind(&input.customer_email)
        .bind(total_minor)
        .bind(&currency)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        // 3. Items; each availability-backed item reserves capacity inside
        //    the same transaction, so a full window aborts the whole booking.
        for (item, unit_price) in &priced_items {
            if let Some(availability_id) = item.availability_id {
                let reserved = sqlx::query(
                    "UPDATE service_availabilities \
                     SET booked_count = booked_count + $2 \
                     WHERE id = $1 AND booked_count + $2 <= total_capacity",
                )
                .bind(availability_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
                if reserved.rows_affected() == 0 {
                    return Err(StoreError::conflict("availability_capacity"));
                }
            }

            sqlx::query(
                "INSERT INTO booking_items \
                 (booking_id, service_id, variant_id, availability_id, quantity, unit_price_minor, currency) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(booking_id)
            .bind(item.service_id)
            .bind(item.variant_id)
            .bind(item.availability_id)
            .bind(item.quantity)
            .bind(unit_price)
            .bind(&currency)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        // 4. Participants.
        for participant in &input.participants {
            sqlx::query(
                "INSERT INTO booking_participants (booking_id, full_name, date_of_birth) \
                 VALUES ($1, $2, $3)",
            )
            .bind(booking_id)
            .bind(&participant.full_name)
            .bind(participant.date_of_birth)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(booking_id, %booking_code, total_minor, "booking created");

        self.get(booking_id).await?.ok_or_else(|| {
            StoreError::Database("created booking missing on re-read".into())
        })
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(
            "SELECT id, booking_code, customer_name, customer_email, status, total_minor, \
             currency, created_at, updated_at \
             FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<BookingItemRow> = sqlx::query_as(
            "SELECT id, service_id, variant_id, availability_id, quantity, unit_price_minor, currency \
             FROM booking_items WHERE booking_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let participant_rows: Vec<ParticipantRow> = sqlx::query_as(
            "SELECT id, full_name, date_of_birth \
             FROM booking_participants WHERE booking_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|e| StoreError::Database(e.into()))?;

        Ok(Some(Booking {
            id: row.id,
            booking_code: row.booking_code,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            status,
            total_minor: row.total_minor,
            currency: row.currency,
            items: item_rows
                .into_iter()
                .map(|r| BookingItem {
                    id: r.id,
                    service_id: r.service_id,
                    variant_id: r.variant_id,
                    availability_id: r.availability_id,
                    quantity: r.quantity,
                    unit_price_minor: r.unit_price_minor,
                    currency: r.currency,
                })
                .collect(),
            participants: participant_rows
                .into_iter()
                .map(|r| Participant {
                    id: r.id,
                    full_name: r.full_name,
                    date_of_birth: r.date_of_birth,
                })
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    async fn update_status(&self, id: i64, status: BookingStatus) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_payment(
        &self,
        booking_id: i64,
        input: NewPayment,
    ) -> StoreResult<Option<Payment>> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        if exists.is_none() {
            return Ok(None);
        }

        let status = input.status.unwrap_or(PaymentStatus::Initiated);
        let payload = input
            .gateway_payload
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let row: PaymentRow = sqlx::query_as(
            "INSERT INTO payments (booking_id, provider, amount_minor, currency, status, gateway_payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, booking_id, provider, amount_minor, currency, status, gateway_payload, created_at",
        )
        .bind(booking_id)
        .bind(&input.provider)
        .bind(input.amount_minor)
        .bind(input.currency.as_deref().unwrap_or("USD"))
        .bind(status.as_str())
        .bind(&payload)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        let status = row
            .status
            .parse::<PaymentStatus>()
            .map_err(|e| StoreError::Database(e.into()))?;

        Ok(Some(Payment {
            id: row.id,
            booking_id: row.booking_id,
            provider: row.provider,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status,
            gateway_payload: row.gateway_payload,
            created_at: row.created_at,
        }))
    }
}
