//! Repository for the `device` table.
//!
//! Mutations run in a transaction so the name-uniqueness check and the
//! write see the same snapshot; the `uq_device_org_name` constraint catches
//! writers that race past the check.

use sensordash_core::device::DeviceError;
use sensordash_core::search::contains_pattern;
use sensordash_core::types::DbId;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::{is_unique_violation, StoreError};
use crate::models::device::{
    CreateDevice, Device, DeviceDto, DeviceRow, DeviceSearch, DeviceSearchResult, UpdateDevice,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, org_id, serial_number, name, location_gps, location_text, floor, \
    activation_code, created_by, created, updated";

/// Unique constraint on `(org_id, name)`.
const NAME_CONSTRAINT: &str = "uq_device_org_name";

/// Provides CRUD and search operations for devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Register a device in `org_id`.
    ///
    /// Fails with [`DeviceError::NameTaken`] if another device in the
    /// organisation already uses the name.
    pub async fn create(
        pool: &PgPool,
        org_id: DbId,
        created_by: Option<DbId>,
        input: &CreateDevice,
    ) -> Result<Device, StoreError> {
        let mut tx = pool.begin().await?;

        if Self::is_name_taken(&mut tx, org_id, &input.name, 0).await? {
            return Err(DeviceError::NameTaken.into());
        }

        let query = format!(
            "INSERT INTO device \
                (org_id, serial_number, name, location_gps, location_text, floor, \
                 activation_code, created_by, created, updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeviceRow>(&query)
            .bind(org_id)
            .bind(&input.serial_number)
            .bind(&input.name)
            .bind(input.location_gps.map(|p| p.to_ewkb()))
            .bind(&input.location_text)
            .bind(&input.floor)
            .bind(input.activation_code)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(name_conflict)?;

        tx.commit().await?;
        Ok(Device::try_from(row)?)
    }

    /// Replace the mutable fields of device `id` in `org_id`.
    ///
    /// Fails with [`DeviceError::NameTaken`] if a *different* device holds
    /// the new name, and with [`DeviceError::NotFound`] if no row matched.
    pub async fn update(
        pool: &PgPool,
        org_id: DbId,
        id: DbId,
        input: &UpdateDevice,
    ) -> Result<Device, StoreError> {
        let mut tx = pool.begin().await?;

        if Self::is_name_taken(&mut tx, org_id, &input.name, id).await? {
            return Err(DeviceError::NameTaken.into());
        }

        let query = format!(
            "UPDATE device SET \
                 name = $3, \
                 serial_number = $4, \
                 location_gps = $5, \
                 location_text = $6, \
                 floor = $7, \
                 activation_code = $8, \
                 updated = NOW() \
             WHERE id = $1 AND org_id = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, DeviceRow>(&query)
            .bind(id)
            .bind(org_id)
            .bind(&input.name)
            .bind(&input.serial_number)
            .bind(input.location_gps.map(|p| p.to_ewkb()))
            .bind(&input.location_text)
            .bind(&input.floor)
            .bind(input.activation_code)
            .fetch_optional(&mut *tx)
            .await
            .map_err(name_conflict)?
            .ok_or(DeviceError::NotFound)?;

        tx.commit().await?;
        Ok(Device::try_from(row)?)
    }

    /// Delete device `id` from `org_id`.
    pub async fn delete(pool: &PgPool, org_id: DbId, id: DbId) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;

        if !Self::exists(&mut tx, org_id, id).await? {
            return Err(DeviceError::NotFound.into());
        }

        sqlx::query("DELETE FROM device WHERE org_id = $1 AND id = $2")
            .bind(org_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Find a device by id within an organisation.
    pub async fn find_by_id(pool: &PgPool, org_id: DbId, id: DbId) -> Result<DeviceDto, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM device WHERE org_id = $1 AND id = $2");
        let row = sqlx::query_as::<_, DeviceRow>(&query)
            .bind(org_id)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DeviceError::NotFound)?;
        Ok(DeviceDto::try_from(row)?)
    }

    /// Find a device by serial number within an organisation.
    ///
    /// Serial numbers are not unique, so the oldest match wins. When
    /// `activation_code` is given the device must also carry that code.
    pub async fn find_by_serial(
        pool: &PgPool,
        org_id: DbId,
        serial_number: &str,
        activation_code: Option<i32>,
    ) -> Result<DeviceDto, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM device \
             WHERE org_id = $1 AND serial_number = $2 \
               AND ($3::INTEGER IS NULL OR activation_code = $3) \
             ORDER BY id \
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, DeviceRow>(&query)
            .bind(org_id)
            .bind(serial_number)
            .bind(activation_code)
            .fetch_optional(pool)
            .await?
            .ok_or(DeviceError::NotFound)?;
        Ok(DeviceDto::try_from(row)?)
    }

    /// List every device of an organisation, ordered by name.
    pub async fn list_by_org(pool: &PgPool, org_id: DbId) -> Result<Vec<DeviceDto>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM device WHERE org_id = $1 ORDER BY name ASC");
        let rows = sqlx::query_as::<_, DeviceRow>(&query)
            .bind(org_id)
            .fetch_all(pool)
            .await?;
        to_dtos(rows)
    }

    /// Search devices by name with pagination.
    ///
    /// The total count is computed with the same filters but without
    /// `LIMIT`/`OFFSET`.
    pub async fn search(
        pool: &PgPool,
        search: &DeviceSearch,
    ) -> Result<DeviceSearchResult, StoreError> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM device"));
        push_filters(&mut select, search);
        select.push(" ORDER BY name ASC");
        if search.limit > 0 {
            let offset = search.limit.saturating_mul(search.page.max(1) - 1);
            select
                .push(" LIMIT ")
                .push_bind(search.limit)
                .push(" OFFSET ")
                .push_bind(offset);
        }
        let rows = select
            .build_query_as::<DeviceRow>()
            .fetch_all(pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM device");
        push_filters(&mut count, search);
        let total_count = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        Ok(DeviceSearchResult {
            total_count,
            devices: to_dtos(rows)?,
            page: search.page,
            per_page: search.limit,
        })
    }

    /// Whether a device other than `existing_id` uses `name` in `org_id`.
    ///
    /// Pass `0` as `existing_id` when creating.
    async fn is_name_taken(
        conn: &mut PgConnection,
        org_id: DbId,
        name: &str,
        existing_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let holder = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM device WHERE org_id = $1 AND name = $2",
        )
        .bind(org_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(matches!(holder, Some(id) if id != existing_id))
    }

    async fn exists(conn: &mut PgConnection, org_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM device WHERE org_id = $1 AND id = $2)",
        )
        .bind(org_id)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
    }
}

/// Append the `WHERE` clause shared by the search and count queries.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, search: &DeviceSearch) {
    builder.push(" WHERE org_id = ").push_bind(search.org_id);

    if let Some(query) = search.query.as_deref().filter(|q| !q.is_empty()) {
        builder
            .push(" AND name ILIKE ")
            .push_bind(contains_pattern(query));
    }
    if let Some(name) = search.name.as_deref().filter(|n| !n.is_empty()) {
        builder.push(" AND name = ").push_bind(name.to_string());
    }
    if let Some(owner_id) = search.owner_id {
        builder.push(" AND created_by = ").push_bind(owner_id);
    }
}

fn to_dtos(rows: Vec<DeviceRow>) -> Result<Vec<DeviceDto>, StoreError> {
    rows.into_iter()
        .map(|row| DeviceDto::try_from(row).map_err(StoreError::from))
        .collect()
}

/// Map a lost race on the name constraint to the name-taken sentinel.
fn name_conflict(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err, NAME_CONSTRAINT) {
        tracing::debug!("Device name claimed by a concurrent writer");
        DeviceError::NameTaken.into()
    } else {
        err.into()
    }
}
