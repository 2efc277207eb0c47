use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use voyago_core::repository::ServiceRepository;
use voyago_core::service::{
    ComboDetails, DetailsPatch, FlightDetails, HotelDetails, NewService, Service, ServiceFilter,
    ServiceStatus, ServiceType, ServiceUpdate, TourDetails, TypeDetails,
};
use voyago_core::slug;
use voyago_core::{StoreError, StoreResult};

use crate::database::map_db_err;

pub struct PostgresServiceRepository {
    pool: PgPool,
}

impl PostgresServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SERVICE_COLUMNS: &str = "id, name, slug, short_description, description, service_type, \
                               status, default_currency, metadata, created_at, updated_at";

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    slug: Option<String>,
    short_description: Option<String>,
    description: Option<String>,
    service_type: String,
    status: String,
    default_currency: String,
    metadata: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> StoreResult<Service> {
        let service_type = self
            .service_type
            .parse::<ServiceType>()
            .map_err(|e| StoreError::Database(e.into()))?;
        let status = self
            .status
            .parse::<ServiceStatus>()
            .map_err(|e| StoreError::Database(e.into()))?;
        Ok(Service {
            id: self.id,
            name: self.name,
            slug: self.slug,
            short_description: self.short_description,
            description: self.description,
            service_type,
            status,
            default_currency: self.default_currency,
            metadata: self.metadata,
            details: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TourDetailRow {
    duration_days: Option<i32>,
    country: Option<String>,
    min_participants: Option<i32>,
    max_participants: Option<i32>,
    itinerary: Option<Value>,
}

#[derive(sqlx::FromRow)]
struct HotelDetailRow {
    hotel_name: Option<String>,
    hotel_address: Option<String>,
    star_rating: Option<i32>,
    room_type: Option<String>,
    bed_type: Option<String>,
    room_size: Option<f64>,
    max_occupancy: Option<i32>,
    amenities: Option<Value>,
    check_in_time: Option<String>,
    check_out_time: Option<String>,
    cancellation_policy: Option<String>,
}

#[derive(sqlx::FromRow)]
struct FlightDetailRow {
    airline: Option<String>,
    flight_number: Option<String>,
    cabin_classes: Value,
}

#[derive(sqlx::FromRow)]
struct ComboDetailRow {
    includes_tour: bool,
    includes_hotel: bool,
    includes_flight: bool,
    description: Option<String>,
    special_offers: Option<String>,
}

fn detail_table(service_type: ServiceType) -> &'static str {
    match service_type {
        ServiceType::Tour => "service_details_tour",
        ServiceType::Hotel => "service_details_hotel",
        ServiceType::Flight => "service_details_flight",
        ServiceType::Combo => "service_details_combo",
    }
}

async fn fetch_details(
    pool: &PgPool,
    service_type: ServiceType,
    service_id: i64,
) -> StoreResult<Option<TypeDetails>> {
    let details = match service_type {
        ServiceType::Tour => {
            let row: Option<TourDetailRow> = sqlx::query_as(
                "SELECT duration_days, country, min_participants, max_participants, itinerary \
                 FROM service_details_tour WHERE service_id = $1",
            )
            .bind(service_id)
            .fetch_optional(pool)
            .await
            .map_err(map_db_err)?;
            row.map(|r| {
                TypeDetails::Tour(TourDetails {
                    duration_days: r.duration_days,
                    country: r.country,
                    min_participants: r.min_participants,
                    max_participants: r.max_participants,
                    itinerary: r.itinerary.and_then(|v| serde_json::from_value(v).ok()),
                })
            })
        }
        ServiceType::Hotel => {
            let row: Option<HotelDetailRow> = sqlx::query_as(
                "SELECT hotel_name, hotel_address, star_rating, room_type, bed_type, room_size, \
                 max_occupancy, amenities, check_in_time, check_out_time, cancellation_policy \
                 FROM service_details_hotel WHERE service_id = $1",
            )
            .bind(service_id)
            .fetch_optional(pool)
            .await
            .map_err(map_db_err)?;
            row.map(|r| {
                TypeDetails::Hotel(HotelDetails {
                    hotel_name: r.hotel_name,
                    hotel_address: r.hotel_address,
                    star_rating: r.star_rating,
                    room_type: r.room_type,
                    bed_type: r.bed_type,
                    room_size: r.room_size,
                    max_occupancy: r.max_occupancy,
                    amenities: r.amenities.and_then(|v| serde_json::from_value(v).ok()),
                    check_in_time: r.check_in_time,
                    check_out_time: r.check_out_time,
                    cancellation_policy: r.cancellation_policy,
                })
            })
        }
        ServiceType::Flight => {
            let row: Option<FlightDetailRow> = sqlx::query_as(
                "SELECT airline, flight_number, cabin_classes \
                 FROM service_details_flight WHERE service_id = $1",
            )
            .bind(service_id)
            .fetch_optional(pool)
            .await
            .map_err(map_db_err)?;
            row.map(|r| {
                TypeDetails::Flight(FlightDetails {
                    airline: r.airline,
                    flight_number: r.flight_number,
                    cabin_classes: r.cabin_classes,
                })
            })
        }
        ServiceType::Combo => {
            let row: Option<ComboDetailRow> = sqlx::query_as(
                "SELECT includes_tour, includes_hotel, includes_flight, description, special_offers \
                 FROM service_details_combo WHERE service_id = $1",
            )
            .bind(service_id)
            .fetch_optional(pool)
            .await
            .map_err(map_db_err)?;
            row.map(|r| {
                TypeDetails::Combo(ComboDetails {
                    includes_tour: r.includes_tour,
                    includes_hotel: r.includes_hotel,
                    includes_flight: r.includes_flight,
                    description: r.description,
                    special_offers: r.special_offers,
                })
            })
        }
    };
    Ok(details)
}

/// Emits only the assignments for fields present in the patch.
fn build_base_update<'a>(id: i64, update: &'a ServiceUpdate) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE services SET ");
    {
        let mut sep = qb.separated(", ");
        if let Some(v) = &update.name {
            sep.push("name = ");
            sep.push_bind_unseparated(v.as_str());
        }
        if let Some(v) = &update.short_description {
            sep.push("short_description = ");
            sep.push_bind_unseparated(v.as_str());
        }
        if let Some(v) = &update.description {
            sep.push("description = ");
            sep.push_bind_unseparated(v.as_str());
        }
        if let Some(v) = update.service_type {
            sep.push("service_type = ");
            sep.push_bind_unseparated(v.as_str());
        }
        if let Some(v) = update.status {
            sep.push("status = ");
            sep.push_bind_unseparated(v.as_str());
        }
        if let Some(v) = &update.default_currency {
            sep.push("default_currency = ");
            sep.push_bind_unseparated(v.as_str());
        }
        sep.push("updated_at = NOW()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb
}

async fn unique_slug(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    id: i64,
) -> StoreResult<String> {
    let base = slug::generate_slug(name, Some(id));

    // Best-effort check; the UNIQUE constraint on the column remains the
    // authoritative guard against racing renames.
    let taken_by: Option<i64> =
        sqlx::query_scalar("SELECT id FROM services WHERE slug = $1 AND id <> $2")
            .bind(&base)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_db_err)?;

    Ok(match taken_by {
        Some(other) => {
            tracing::warn!(slug = %base, taken_by = other, "slug already taken, disambiguating");
            slug::with_unique_suffix(&base, Utc::now().timestamp_millis())
        }
        None => base,
    })
}

async fn insert_details(
    tx: &mut Transaction<'_, Postgres>,
    service_id: i64,
    details: &DetailsPatch,
) -> StoreResult<()> {
    match details {
        DetailsPatch::Tour(p) => {
            let itinerary = p
                .itinerary
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| StoreError::Database(Box::new(e)))?;
            sqlx::query(
                "INSERT INTO service_details_tour \
                 (service_id, duration_days, country, min_participants, max_participants, itinerary) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(service_id)
            .bind(p.duration_days)
            .bind(p.country.as_deref())
            .bind(p.min_participants)
            .bind(p.max_participants)
            .bind(itinerary)
            .execute(&mut **tx)
            .await
            .map_err(map_db_err)?;
        }
        DetailsPatch::Hotel(p) => {
            let amenities = p
                .amenities
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| StoreError::Database(Box::new(e)))?;
            sqlx::query(
                "INSERT INTO service_details_hotel \
                 (service_id, hotel_name, hotel_address, star_rating, room_type, bed_type, \
                  room_size, max_occupancy, amenities, check_in_time, check_out_time, \
                  cancellation_policy) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(service_id)
            .bind(p.hotel_name.as_deref())
            .bind(p.hotel_address.as_deref())
            .bind(p.star_rating)
            .bind(p.room_type.as_deref())
            .bind(p.bed_type.as_deref())
            .bind(p.room_size)
            .bind(p.max_occupancy)
            .bind(amenities)
            .bind(p.check_in_time.as_deref())
            .bind(p.check_out_time.as_deref())
            .bind(p.cancellation_policy.as_deref())
            .execute(&mut **tx)
            .await
            .map_err(map_db_err)?;
        }
        DetailsPatch::Flight(p) => {
            sqlx::query(
                "INSERT INTO service_details_flight \
                 (service_id, airline, flight_number, cabin_classes) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(service_id)
            .bind(p.airline.as_deref())
            .bind(p.flight_number.as_deref())
            .bind(Value::Object(p.extras()))
            .execute(&mut **tx)
            .await
            .map_err(map_db_err)?;
        }
        DetailsPatch::Combo(p) => {
            sqlx::query(
                "INSERT INTO service_details_combo \
                 (service_id, includes_tour, includes_hotel, includes_flight, description, \
                  special_offers) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(service_id)
            .bind(p.includes_tour.unwrap_or(false))
            .bind(p.includes_hotel.unwrap_or(false))
            .bind(p.includes_flight.unwrap_or(false))
            .bind(p.description.as_deref())
            .bind(p.special_offers.as_deref())
            .execute(&mut **tx)
            .await
            .map_err(map_db_err)?;
        }
    }
    Ok(())
}

async fn update_details(
    tx: &mut Transaction<'_, Postgres>,
    service_id: i64,
    details: &DetailsPatch,
) -> StoreResult<()> {
    match details {
        DetailsPatch::Tour(p) => {
            let itinerary = p
                .itinerary
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| StoreError::Database(Box::new(e)))?;
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE service_details_tour SET ");
            {
                let mut sep = qb.separated(", ");
                if let Some(v) = p.duration_days {
                    sep.push("duration_days = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &p.country {
                    sep.push("country = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = p.min_participants {
                    sep.push("min_participants = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = p.max_participants {
                    sep.push("max_participants = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = itinerary {
                    sep.push("itinerary = ");
                    sep.push_bind_unseparated(v);
                }
            }
            qb.push(" WHERE service_id = ");
            qb.push_bind(service_id);
            qb.build().execute(&mut **tx).await.map_err(map_db_err)?;
        }
        DetailsPatch::Hotel(p) => {
            let amenities = p
                .amenities
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| StoreError::Database(Box::new(e)))?;
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE service_details_hotel SET ");
            {
                let mut sep = qb.separated(", ");
                if let Some(v) = &p.hotel_name {
                    sep.push("hotel_name = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = &p.hotel_address {
                    sep.push("hotel_address = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = p.star_rating {
                    sep.push("star_rating = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &p.room_type {
                    sep.push("room_type = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = &p.bed_type {
                    sep.push("bed_type = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = p.room_size {
                    sep.push("room_size = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = p.max_occupancy {
                    sep.push("max_occupancy = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = amenities {
                    sep.push("amenities = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &p.check_in_time {
                    sep.push("check_in_time = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = &p.check_out_time {
                    sep.push("check_out_time = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = &p.cancellation_policy {
                    sep.push("cancellation_policy = ");
                    sep.push_bind_unseparated(v.as_str());
                }
            }
            qb.push(" WHERE service_id = ");
            qb.push_bind(service_id);
            qb.build().execute(&mut **tx).await.map_err(map_db_err)?;
        }
        DetailsPatch::Flight(p) => {
            // Only airline and flight_number have physical columns; the rest
            // merges into the cabin_classes bag keyed by field name.
            let extras = p.extras();
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE service_details_flight SET ");
            {
                let mut sep = qb.separated(", ");
                if let Some(v) = &p.airline {
                    sep.push("airline = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = &p.flight_number {
                    sep.push("flight_number = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if !extras.is_empty() {
                    sep.push("cabin_classes = cabin_classes || ");
                    sep.push_bind_unseparated(Value::Object(extras));
                }
            }
            qb.push(" WHERE service_id = ");
            qb.push_bind(service_id);
            qb.build().execute(&mut **tx).await.map_err(map_db_err)?;
        }
        DetailsPatch::Combo(p) => {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE service_details_combo SET ");
            {
                let mut sep = qb.separated(", ");
                if let Some(v) = p.includes_tour {
                    sep.push("includes_tour = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = p.includes_hotel {
                    sep.push("includes_hotel = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = p.includes_flight {
                    sep.push("includes_flight = ");
                    sep.push_bind_unseparated(v);
                }
                if let Some(v) = &p.description {
                    sep.push("description = ");
                    sep.push_bind_unseparated(v.as_str());
                }
                if let Some(v) = &p.special_offers {
                    sep.push("special_offers = ");
                    sep.push_bind_unseparated(v.as_str());
                }
            }
            qb.push(" WHERE service_id = ");
            qb.push_bind(service_id);
            qb.build().execute(&mut **tx).await.map_err(map_db_err)?;
        }
    }
    Ok(())
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepository {
    async fn create(&self, input: NewService) -> StoreResult<Service> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let status = input.status.unwrap_or(ServiceStatus::Draft);
        let currency = input.default_currency.as_deref().unwrap_or("USD");

        let mut metadata = match input.metadata {
            Some(v) if v.is_object() => v,
            _ => Value::Object(serde_json::Map::new()),
        };
        if let (Some(location), Some(obj)) = (&input.location, metadata.as_object_mut()) {
            obj.insert("location".to_string(), Value::String(location.clone()));
        }

        // 1. Base row; slug stays NULL until the generated id is known.
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO services \
             (name, short_description, description, service_type, status, default_currency, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&input.name)
        .bind(input.short_description.as_deref())
        .bind(input.description.as_deref())
        .bind(input.service_type.as_str())
        .bind(status.as_str())
        .bind(currency)
        .bind(&metadata)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        // 2. Slug derived from name + generated id.
        let slug = unique_slug(&mut tx, &input.name, id).await?;
        sqlx::query("UPDATE services SET slug = $1 WHERE id = $2")
            .bind(&slug)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        // 3. Detail row only when the payload carries significant fields for
        //    the type. Zero detail rows is a legal outcome.
        if let Some(details) = &input.details {
            if details.is_significant() {
                insert_details(&mut tx, id, details).await?;
            }
        }

        tx.commit().await.map_err(map_db_err)?;

        tracing::info!(service_id = id, slug = %slug, "service created");

        self.get(id).await?.ok_or_else(|| {
            StoreError::Database("created service missing on re-read".into())
        })
    }

    async fn update(&self, id: i64, update: ServiceUpdate) -> StoreResult<Option<Service>> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let current: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let Some(current) = current else {
            // Nothing written yet; dropping the transaction rolls it back.
            return Ok(None);
        };
        let current_type = current
            .service_type
            .parse::<ServiceType>()
            .map_err(|e| StoreError::Database(e.into()))?;

        // 1. Whitelisted base fields, only the present assignments.
        if update.has_base_changes() {
            build_base_update(id, &update)
                .build()
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        // 2. Merge location into the metadata bag; sibling keys survive.
        if let Some(location) = &update.location {
            sqlx::query(
                "UPDATE services \
                 SET metadata = metadata || jsonb_build_object('location', $1::text), \
                     updated_at = NOW() \
                 WHERE id = $2",
            )
            .bind(location)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        // 3. A rename regenerates the slug.
        if let Some(name) = &update.name {
            let slug = unique_slug(&mut tx, name, id).await?;
            sqlx::query("UPDATE services SET slug = $1 WHERE id = $2")
                .bind(&slug)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_err)?;
        }

        // 4. Detail table for the target type: UPDATE when the row exists,
        //    INSERT when it doesn't and the patch is significant.
        if let Some(details) = &update.details {
            if !details.is_empty() {
                let target_type = update.service_type.unwrap_or(current_type);
                if details.service_type() != target_type {
                    tracing::warn!(
                        service_id = id,
                        patch_type = %details.service_type(),
                        target_type = %target_type,
                        "detail patch type does not match service type, skipping"
                    );
                } else {
                    let exists: Option<i64> = sqlx::query_scalar(&format!(
                        "SELECT service_id FROM {} WHERE service_id = $1",
                        detail_table(target_type)
                    ))
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_db_err)?;

                    if exists.is_some() {
                        update_details(&mut tx, id, details).await?;
                    } else if details.is_significant() {
                        insert_details(&mut tx, id, details).await?;
                    }
                }
            }
        }

        tx.commit().await.map_err(map_db_err)?;

        // Freshly re-read, never a partial view assembled from the patch.
        self.get(id).await
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Service>> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut service = row.into_service()?;
        service.details = fetch_details(&self.pool, service.service_type, service.id).await?;
        Ok(Some(service))
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Service>> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM services WHERE slug = $1",
            SERVICE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut service = row.into_service()?;
        service.details = fetch_details(&self.pool, service.service_type, service.id).await?;
        Ok(Some(service))
    }

    /// Listings skip the per-type detail rows; fetch a single service for
    /// those.
    async fn list(&self, filter: ServiceFilter) -> StoreResult<Vec<Service>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM services WHERE 1=1",
            SERVICE_COLUMNS
        ));
        if let Some(t) = filter.service_type {
            qb.push(" AND service_type = ");
            qb.push_bind(t.as_str());
        }
        if let Some(s) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(s.as_str());
        }
        qb.push(" ORDER BY created_at DESC");

        let rows: Vec<ServiceRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        rows.into_iter().map(|r| r.into_service()).collect()
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE services SET status = 'INACTIVE', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_update_emits_only_present_assignments() {
        let update = ServiceUpdate {
            name: Some("Mekong Delta Cruise".to_string()),
            status: Some(ServiceStatus::Active),
            ..Default::default()
        };
        let mut qb = build_base_update(42, &update);
        let sql = qb.sql();
        assert!(sql.contains("name = $1"));
        assert!(sql.contains("status = $2"));
        assert!(sql.contains("updated_at = NOW()"));
        assert!(sql.ends_with("WHERE id = $3"));
        assert!(!sql.contains("description ="));
        assert!(!sql.contains("default_currency ="));
    }

    #[test]
    fn base_update_with_all_fields() {
        let update = ServiceUpdate {
            name: Some("x".into()),
            short_description: Some("x".into()),
            description: Some("x".into()),
            service_type: Some(ServiceType::Hotel),
            status: Some(ServiceStatus::Draft),
            default_currency: Some("VND".into()),
            ..Default::default()
        };
        let mut qb = build_base_update(1, &update);
        let sql = qb.sql();
        for fragment in [
            "name = $1",
            "short_description = $2",
            "description = $3",
            "service_type = $4",
            "status = $5",
            "default_currency = $6",
        ] {
            assert!(sql.contains(fragment), "missing {} in {}", fragment, sql);
        }
    }

    #[test]
    fn detail_tables_cover_every_type() {
        assert_eq!(detail_table(ServiceType::Tour), "service_details_tour");
        assert_eq!(detail_table(ServiceType::Hotel), "service_details_hotel");
        assert_eq!(detail_table(ServiceType::Flight), "service_details_flight");
        assert_eq!(detail_table(ServiceType::Combo), "service_details_combo");
    }
}
