use async_trait::async_trait;
use aviary_core::bird::{BirdDetails, BirdFields, BirdId, ConservationStatus, Photo};
use aviary_core::error::{Result, StorageError};
use aviary_core::repository::{PhotoRetention, ReadRepository, Repository};
use aviary_core::search::SearchTerm;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, MySqlPool, Row};
use tracing::debug;

/// Schema statements, applied in order by [`MySqlRepository::ensure_schema`].
const SCHEMA: [&str; 4] = [
    include_str!("../ddl/mysql/001_conservation_status.sql"),
    include_str!("../ddl/mysql/002_bird.sql"),
    include_str!("../ddl/mysql/003_photos.sql"),
    include_str!("../ddl/mysql/004_seed_conservation_status.sql"),
];

/// Birds joined with their status and their most recent photo, so each bird
/// yields at most one row.
const BIRD_DETAILS_SELECT: &str = r#"
    SELECT b.bird_id, b.primary_name, b.english_name, b.scientific_name,
           b.order_name, b.family, b.weight, b.length, b.status_id,
           c.status_name, c.status_colour, p.filename, p.photographer
    FROM Bird b
    LEFT JOIN ConservationStatus c ON b.status_id = c.status_id
    LEFT JOIN Photos p ON p.photo_id = (
        SELECT MAX(p2.photo_id) FROM Photos p2 WHERE p2.bird_id = b.bird_id
    )
"#;

/// MySQL implementation of the bird repository.
///
/// Multi-statement writes (bird plus photo, photo replacement, cascading
/// delete) run inside a transaction, so a failure part way leaves the
/// previous state intact.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
    retention: PhotoRetention,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            retention: PhotoRetention::default(),
        }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Sets what happens to photo rows when their bird is deleted.
    pub fn with_retention(mut self, retention: PhotoRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the tables if they are missing and seeds the conservation
    /// statuses. Safe to run repeatedly.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        debug!("mysql schema ensured");
        Ok(())
    }

    async fn fetch_details(
        &self,
        filter: &str,
        term: Option<&SearchTerm>,
    ) -> Result<Vec<BirdDetails>> {
        let sql = format!("{BIRD_DETAILS_SELECT} {filter} ORDER BY b.bird_id");
        let mut query = sqlx::query(&sql);
        if let Some(term) = term {
            let pattern = term.like_pattern();
            query = query
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(pattern)
                .bind(term.bird_id().map(BirdId::get));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(bird_details_from_row).collect()
    }
}

fn is_constraint_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| {
        db.is_foreign_key_violation() || db.is_unique_violation() || db.is_check_violation()
    })
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    if is_constraint_violation(&err) {
        return StorageError::Constraint(message);
    }

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn bird_details_from_row(row: &MySqlRow) -> Result<BirdDetails> {
    let bird_id: i64 = row.try_get("bird_id").map_err(map_sqlx_error)?;
    let status_id: Option<i64> = row.try_get("status_id").map_err(map_sqlx_error)?;
    let status_name: Option<String> = row.try_get("status_name").map_err(map_sqlx_error)?;
    let status_colour: Option<String> = row.try_get("status_colour").map_err(map_sqlx_error)?;
    let filename: Option<String> = row.try_get("filename").map_err(map_sqlx_error)?;
    let photographer: Option<String> = row.try_get("photographer").map_err(map_sqlx_error)?;

    let fields = BirdFields {
        primary_name: row.try_get("primary_name").map_err(map_sqlx_error)?,
        english_name: row.try_get("english_name").map_err(map_sqlx_error)?,
        scientific_name: row.try_get("scientific_name").map_err(map_sqlx_error)?,
        order_name: row.try_get("order_name").map_err(map_sqlx_error)?,
        family: row.try_get("family").map_err(map_sqlx_error)?,
        weight: row.try_get("weight").map_err(map_sqlx_error)?,
        length: row.try_get("length").map_err(map_sqlx_error)?,
        status_id,
    };

    let status = match (status_id, status_name, status_colour) {
        (Some(status_id), Some(status_name), Some(status_colour)) => Some(ConservationStatus {
            status_id,
            status_name,
            status_colour,
        }),
        _ => None,
    };

    Ok(BirdDetails {
        bird_id: BirdId::new(bird_id),
        fields,
        status,
        photo: filename.map(|filename| Photo {
            filename,
            photographer,
        }),
    })
}

async fn insert_bird(conn: &mut MySqlConnection, fields: &BirdFields) -> Result<BirdId> {
    let result = sqlx::query(
        r#"
        INSERT INTO Bird (primary_name, english_name, scientific_name, order_name,
                          family, weight, length, status_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&fields.primary_name)
    .bind(&fields.english_name)
    .bind(&fields.scientific_name)
    .bind(&fields.order_name)
    .bind(&fields.family)
    .bind(fields.weight)
    .bind(fields.length)
    .bind(fields.status_id)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let id = i64::try_from(result.last_insert_id()).map_err(|e| {
        StorageError::InvalidData(format!(
            "generated bird id '{}' out of range: {e}",
            result.last_insert_id()
        ))
    })?;

    Ok(BirdId::new(id))
}

async fn insert_photo(conn: &mut MySqlConnection, id: BirdId, photo: &Photo) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO Photos (bird_id, filename, photographer)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(id.get())
    .bind(&photo.filename)
    .bind(&photo.photographer)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

async fn delete_photos(conn: &mut MySqlConnection, id: BirdId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM Photos WHERE bird_id = ?")
        .bind(id.get())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    Ok(result.rows_affected())
}

async fn bird_exists(conn: &mut MySqlConnection, id: BirdId) -> Result<bool> {
    let exists = sqlx::query("SELECT 1 FROM Bird WHERE bird_id = ? LIMIT 1")
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

    Ok(exists)
}

async fn update_bird_row(
    conn: &mut MySqlConnection,
    id: BirdId,
    fields: &BirdFields,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE Bird
        SET primary_name = ?, english_name = ?, scientific_name = ?, order_name = ?,
            family = ?, weight = ?, length = ?, status_id = ?
        WHERE bird_id = ?
        "#,
    )
    .bind(&fields.primary_name)
    .bind(&fields.english_name)
    .bind(&fields.scientific_name)
    .bind(&fields.order_name)
    .bind(&fields.family)
    .bind(fields.weight)
    .bind(fields.length)
    .bind(fields.status_id)
    .bind(id.get())
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    // Rewriting identical values can report zero affected rows.
    if result.rows_affected() > 0 {
        return Ok(true);
    }
    bird_exists(conn, id).await
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn list_statuses(&self) -> Result<Vec<ConservationStatus>> {
        let rows = sqlx::query(
            r#"
            SELECT status_id, status_name, status_colour
            FROM ConservationStatus
            ORDER BY status_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                Ok(ConservationStatus {
                    status_id: row.try_get("status_id").map_err(map_sqlx_error)?,
                    status_name: row.try_get("status_name").map_err(map_sqlx_error)?,
                    status_colour: row.try_get("status_colour").map_err(map_sqlx_error)?,
                })
            })
            .collect()
    }

    async fn list_birds(&self) -> Result<Vec<BirdDetails>> {
        self.fetch_details("", None).await
    }

    async fn get_bird(&self, id: BirdId) -> Result<Option<BirdDetails>> {
        let sql = format!("{BIRD_DETAILS_SELECT} WHERE b.bird_id = ? LIMIT 1");

        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(bird_details_from_row).transpose()
    }

    async fn search_birds(&self, term: &SearchTerm) -> Result<Vec<BirdDetails>> {
        if term.is_empty() {
            return Ok(Vec::new());
        }

        debug!(term = %term.as_str(), by_id = term.bird_id().is_some(), "searching birds");

        // A NULL id parameter never compares equal, so non-numeric terms
        // only match by name. The collation keeps accents significant, as
        // the in-memory backend does.
        self.fetch_details(
            r#"
            WHERE LOWER(b.primary_name) COLLATE utf8mb4_0900_as_ci LIKE ? ESCAPE '!'
               OR LOWER(b.english_name) COLLATE utf8mb4_0900_as_ci LIKE ? ESCAPE '!'
               OR LOWER(b.scientific_name) COLLATE utf8mb4_0900_as_ci LIKE ? ESCAPE '!'
               OR b.bird_id = ?
            "#,
            Some(term),
        )
        .await
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn create_bird(&self, fields: &BirdFields) -> Result<BirdId> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        insert_bird(&mut conn, fields).await
    }

    async fn attach_photo(&self, id: BirdId, photo: &Photo) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        insert_photo(&mut conn, id, photo).await
    }

    async fn update_bird(&self, id: BirdId, fields: &BirdFields) -> Result<bool> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        update_bird_row(&mut conn, id, fields).await
    }

    async fn replace_photo(&self, id: BirdId, photo: &Photo) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let removed = delete_photos(&mut tx, id).await?;
        insert_photo(&mut tx, id, photo).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(bird_id = %id, removed, filename = %photo.filename, "replaced photo");
        Ok(())
    }

    async fn delete_bird(&self, id: BirdId) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if self.retention == PhotoRetention::Cascade {
            let removed = delete_photos(&mut tx, id).await?;
            debug!(bird_id = %id, removed, "cascading photo delete");
        }

        let result = sqlx::query("DELETE FROM Bird WHERE bird_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_bird_with_photo(
        &self,
        fields: &BirdFields,
        photo: Option<&Photo>,
    ) -> Result<BirdId> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let id = insert_bird(&mut tx, fields).await?;
        if let Some(photo) = photo {
            insert_photo(&mut tx, id, photo).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(bird_id = %id, with_photo = photo.is_some(), "created bird");
        Ok(id)
    }

    async fn update_bird_with_photo(
        &self,
        id: BirdId,
        fields: &BirdFields,
        photo: Option<&Photo>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !update_bird_row(&mut tx, id, fields).await? {
            return Ok(false);
        }
        if let Some(photo) = photo {
            delete_photos(&mut tx, id).await?;
            insert_photo(&mut tx, id, photo).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(bird_id = %id, with_photo = photo.is_some(), "updated bird");
        Ok(true)
    }
}
