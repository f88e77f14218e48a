use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, types::Json, MySql, Pool, QueryBuilder, Row};
use std::marker::PhantomData;

use super::interface::{PlaceFilter, PlaceRepository};
use super::model::{Address, GeoPoint, Place, PlaceDetails};
use crate::storage::StoreResult;

// =============================================================================
// PLACE CRUD
// =============================================================================

/// MySQL-backed collection for one place type; the table comes from the
/// type's descriptor.
pub struct PlaceCrud<D> {
    pool: Pool<MySql>,
    _details: PhantomData<fn() -> D>,
}

impl<D: PlaceDetails> PlaceCrud<D> {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self {
            pool,
            _details: PhantomData,
        }
    }

    fn table() -> &'static str {
        D::DESCRIPTOR.table
    }
}

fn place_from_row<D: PlaceDetails>(row: &MySqlRow) -> StoreResult<Place<D>> {
    let Json(address): Json<Address> = row.try_get("address")?;
    let Json(mut details): Json<D> = row.try_get("details")?;
    // The column is authoritative; the JSON copy is whatever the last merge wrote.
    details.set_verified(row.try_get("is_verified")?);
    let Json(images): Json<Vec<String>> = row.try_get("images")?;
    let Json(documents): Json<Vec<String>> = row.try_get("documents")?;

    Ok(Place {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        address,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        website: row.try_get("website")?,
        location: GeoPoint::new(row.try_get("longitude")?, row.try_get("latitude")?),
        owner_id: row.try_get("owner_id")?,
        is_active: row.try_get("is_active")?,
        rating: row.try_get("rating")?,
        total_ratings: row.try_get("total_ratings")?,
        images,
        documents,
        details,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn push_distance(qb: &mut QueryBuilder<'_, MySql>, center: &GeoPoint) {
    qb.push("ST_Distance_Sphere(POINT(longitude, latitude), POINT(")
        .push_bind(center.longitude)
        .push(", ")
        .push_bind(center.latitude)
        .push("))");
}

fn push_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &PlaceFilter) {
    qb.push(" WHERE 1 = 1");

    if filter.require_active {
        qb.push(" AND is_active = TRUE");
    }
    if filter.require_verified {
        qb.push(" AND is_verified = TRUE");
    }
    if let Some(near) = &filter.near {
        qb.push(" AND ");
        push_distance(qb, &near.center);
        qb.push(" <= ").push_bind(near.radius_meters);
    }
    if !filter.tags_any.is_empty() {
        let tags = serde_json::Value::from(filter.tags_any.clone()).to_string();
        qb.push(" AND JSON_OVERLAPS(tags, CAST(")
            .push_bind(tags)
            .push(" AS JSON))");
    }
    if let Some(min) = filter.min_rating {
        qb.push(" AND rating >= ").push_bind(min);
    }
}

#[async_trait]
impl<D: PlaceDetails> PlaceRepository<D> for PlaceCrud<D> {
    async fn insert(&self, place: &Place<D>) -> StoreResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, name, description, address, phone, email, website, longitude, latitude,
                            owner_id, is_active, is_verified, rating, total_ratings, tags, details,
                            images, documents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            Self::table()
        );

        sqlx::query(&sql)
            .bind(&place.id)
            .bind(&place.name)
            .bind(&place.description)
            .bind(Json(&place.address))
            .bind(&place.phone)
            .bind(&place.email)
            .bind(&place.website)
            .bind(place.location.longitude)
            .bind(place.location.latitude)
            .bind(&place.owner_id)
            .bind(place.is_active)
            .bind(place.details.is_verified())
            .bind(place.rating)
            .bind(place.total_ratings)
            .bind(Json(place.details.tags()))
            .bind(Json(&place.details))
            .bind(Json(&place.images))
            .bind(Json(&place.documents))
            .bind(place.created_at)
            .bind(place.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_active(&self, id: &str) -> StoreResult<Option<Place<D>>> {
        let sql = format!("SELECT * FROM {} WHERE id = ? AND is_active = TRUE", Self::table());
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(place_from_row::<D>).transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Place<D>>> {
        let sql = format!(
            "SELECT * FROM {} WHERE owner_id = ? AND is_active = TRUE ORDER BY created_at DESC, id ASC",
            Self::table()
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(place_from_row::<D>).collect()
    }

    async fn update(&self, place: &Place<D>) -> StoreResult<bool> {
        let sql = format!(
            r#"
            UPDATE {} SET name = ?, description = ?, address = ?, phone = ?, email = ?, website = ?,
                          longitude = ?, latitude = ?, tags = ?, details = ?, images = ?, documents = ?,
                          updated_at = ?
            WHERE id = ? AND is_active = TRUE
            "#,
            Self::table()
        );

        let result = sqlx::query(&sql)
            .bind(&place.name)
            .bind(&place.description)
            .bind(Json(&place.address))
            .bind(&place.phone)
            .bind(&place.email)
            .bind(&place.website)
            .bind(place.location.longitude)
            .bind(place.location.latitude)
            .bind(Json(place.details.tags()))
            .bind(Json(&place.details))
            .bind(Json(&place.images))
            .bind(Json(&place.documents))
            .bind(place.updated_at)
            .bind(&place.id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate(&self, id: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        let sql = format!(
            "UPDATE {} SET is_active = FALSE, updated_at = ? WHERE id = ? AND is_active = TRUE",
            Self::table()
        );
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_verified(&self, id: &str, now: DateTime<Utc>) -> StoreResult<Option<Place<D>>> {
        let sql = format!(
            "UPDATE {} SET is_verified = TRUE, updated_at = ? WHERE id = ? AND is_active = TRUE",
            Self::table()
        );
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_active(id).await
    }

    async fn add_rating(
        &self,
        id: &str,
        score: f64,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Place<D>>> {
        // MySQL evaluates SET left to right: rating must read the old count.
        let sql = format!(
            r#"
            UPDATE {} SET rating = (rating * total_ratings + ?) / (total_ratings + 1),
                          total_ratings = total_ratings + 1,
                          updated_at = ?
            WHERE id = ? AND is_active = TRUE
            "#,
            Self::table()
        );

        let result = sqlx::query(&sql)
            .bind(score)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_active(id).await
    }

    async fn find(
        &self,
        filter: &PlaceFilter,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Place<D>>> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM ");
        qb.push(Self::table());
        push_filter(&mut qb, filter);

        qb.push(" ORDER BY rating DESC, ");
        if let Some(near) = &filter.near {
            push_distance(&mut qb, &near.center);
            qb.push(" ASC, ");
        }
        qb.push("id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(skip);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(place_from_row::<D>).collect()
    }

    async fn count(&self, filter: &PlaceFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM ");
        qb.push(Self::table());
        push_filter(&mut qb, filter);

        let total: i64 = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}
