use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use voyago_core::repository::VariantRepository;
use voyago_core::variant::{NewVariant, Variant, VariantAttributeFilter, VariantUpdate};
use voyago_core::StoreResult;

use crate::database::map_db_err;

pub struct PostgresVariantRepository {
    pool: PgPool,
}

impl PostgresVariantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const VARIANT_COLUMNS: &str =
    "id, service_id, name, price_minor, currency, capacity, attributes, is_active, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: i64,
    service_id: i64,
    name: String,
    price_minor: i64,
    currency: String,
    capacity: Option<i32>,
    attributes: Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VariantRow {
    fn into_variant(self) -> Variant {
        Variant {
            id: self.id,
            service_id: self.service_id,
            name: self.name,
            price_minor: self.price_minor,
            currency: self.currency,
            capacity: self.capacity,
            attributes: self.attributes,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// One parameterized predicate per present filter key, reaching into the
/// JSONB attributes bag.
fn build_attribute_query(
    service_id: i64,
    filter: &VariantAttributeFilter,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM service_variants WHERE service_id = ",
        VARIANT_COLUMNS
    ));
    qb.push_bind(service_id);
    qb.push(" AND is_active = TRUE");
    if let Some(cabin) = &filter.cabin_class {
        qb.push(" AND attributes->>'cabin_class' = ");
        qb.push_bind(cabin.clone());
    }
    if let Some(checked) = &filter.checked_baggage {
        qb.push(" AND attributes->'baggage'->>'checked' = ");
        qb.push_bind(checked.clone());
    }
    if let Some(meal) = filter.meal_included {
        qb.push(" AND (attributes->>'meal_included')::boolean = ");
        qb.push_bind(meal);
    }
    if let Some(boarding) = filter.priority_boarding {
        qb.push(" AND (attributes->>'priority_boarding')::boolean = ");
        qb.push_bind(boarding);
    }
    qb.push(" ORDER BY id");
    qb
}

#[async_trait]
impl VariantRepository for PostgresVariantRepository {
    async fn create(&self, service_id: i64, input: NewVariant) -> StoreResult<Variant> {
        let attributes = input
            .attributes
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let row: VariantRow = sqlx::query_as(&format!(
            "INSERT INTO service_variants (service_id, name, price_minor, currency, capacity, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            VARIANT_COLUMNS
        ))
        .bind(service_id)
        .bind(&input.name)
        .bind(input.price_minor)
        .bind(input.currency.as_deref().unwrap_or("USD"))
        .bind(input.capacity)
        .bind(&attributes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(row.into_variant())
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Variant>> {
        let row: Option<VariantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM service_variants WHERE id = $1",
            VARIANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(row.map(VariantRow::into_variant))
    }

    async fn update(&self, id: i64, update: VariantUpdate) -> StoreResult<Option<Variant>> {
        if update.is_empty() {
            // Nothing to write; just report current state.
            return self.get(id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE service_variants SET ");
        {
            let mut sep = qb.separated(", ");
            if let Some(v) = &update.name {
                sep.push("name = ");
                sep.push_bind_unseparated(v.as_str());
            }
            if let Some(v) = update.price_minor {
                sep.push("price_minor = ");
                sep.push_bind_unseparated(v);
            }
            if let Some(v) = &update.currency {
                sep.push("currency = ");
                sep.push_bind_unseparated(v.as_str());
            }
            if let Some(v) = update.capacity {
                sep.push("capacity = ");
                sep.push_bind_unseparated(v);
            }
            if let Some(v) = &update.attributes {
                sep.push("attributes = ");
                sep.push_bind_unseparated(v);
            }
            if let Some(v) = update.is_active {
                sep.push("is_active = ");
                sep.push_bind_unseparated(v);
            }
            sep.push("updated_at = NOW()");
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(format!(" RETURNING {}", VARIANT_COLUMNS));

        let row: Option<VariantRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(VariantRow::into_variant))
    }

    async fn deactivate(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE service_variants SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_service(&self, service_id: i64) -> StoreResult<Vec<Variant>> {
        let rows: Vec<VariantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM service_variants WHERE service_id = $1 ORDER BY id",
            VARIANT_COLUMNS
        ))
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(VariantRow::into_variant).collect())
    }

    async fn query_by_attributes(
        &self,
        service_id: i64,
        filter: VariantAttributeFilter,
    ) -> StoreResult<Vec<Variant>> {
        let mut qb = build_attribute_query(service_id, &filter);
        let rows: Vec<VariantRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(VariantRow::into_variant).collect())
    }
}
