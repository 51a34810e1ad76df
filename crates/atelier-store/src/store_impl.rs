//! `Store` implementation for SQLite
//!
//! Every guarded write is a single statement whose `WHERE` clause carries
//! the owner and lifecycle precondition, so a concurrent change can never
//! slip between the check and the write.

use atelier_core::access::FileGrant;
use atelier_core::collection::BoundedInsert;
use atelier_core::lifecycle::{StateGuard, Transition};
use atelier_core::model::{
    Asset, Element, ElementChanges, File, UpdateAsset, UpdateFile, User, UserId, UserSync,
};
use atelier_core::query::{FileOrder, FileQuery, View};
use atelier_core::store::Store;
use atelier_core::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::helpers::{
    db_err, placement_err, row_to_asset, row_to_element, row_to_file, row_to_grant, row_to_user,
    ts, ASSET_COLUMNS, ELEMENT_COLUMNS, FILE_COLUMNS, USER_COLUMNS,
};
use crate::sqlite_store::SqliteStore;

/// Predicate on `files f` that the caller, bound as `?1`, collaborates on it
const IS_COLLABORATOR: &str =
    "EXISTS (SELECT 1 FROM collaborators c WHERE c.file_id = f.id AND c.user_id = ?1)";

/// Predicate on a child table that its file is active and owned by `?2`
const PARENT_WRITABLE: &str = "EXISTS (SELECT 1 FROM files f \
     WHERE f.id = file_id AND f.owner_id = ?2 AND f.deleted_at IS NULL)";

fn view_filter(view: View) -> String {
    match view {
        View::All => format!("f.deleted_at IS NULL AND (f.owner_id = ?1 OR {IS_COLLABORATOR})"),
        View::MyFiles => "f.deleted_at IS NULL AND f.owner_id = ?1".to_string(),
        View::Shared => format!("f.deleted_at IS NULL AND f.owner_id <> ?1 AND {IS_COLLABORATOR}"),
        View::Trash => "f.deleted_at IS NOT NULL AND f.owner_id = ?1".to_string(),
    }
}

fn guard_clause(guard: StateGuard) -> &'static str {
    match guard {
        StateGuard::Active => "AND deleted_at IS NULL",
        StateGuard::Trashed => "AND deleted_at IS NOT NULL",
        StateGuard::Any => "",
    }
}

fn order_clause(order: FileOrder) -> &'static str {
    match order {
        FileOrder::UpdatedDesc => "f.updated_at DESC, f.id",
        FileOrder::NameAsc => "f.name COLLATE NOCASE ASC, f.id",
        FileOrder::NameDesc => "f.name COLLATE NOCASE DESC, f.id",
        FileOrder::CreatedDesc => "f.created_at DESC, f.id",
        FileOrder::DeletedDesc => "f.deleted_at DESC, f.id",
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // =========================================================================
    // Users
    // =========================================================================

    #[instrument(skip(self, sync), fields(subject = %sync.subject))]
    async fn upsert_user(&self, sync: &UserSync, at: DateTime<Utc>) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, subject, email, display_name, avatar_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT(subject) DO UPDATE SET
                email = CASE WHEN excluded.email = '' THEN users.email ELSE excluded.email END,
                display_name = COALESCE(excluded.display_name, users.display_name),
                avatar_url = COALESCE(excluded.avatar_url, users.avatar_url),
                updated_at = excluded.updated_at
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&sync.subject)
        .bind(&sync.email)
        .bind(&sync.display_name)
        .bind(&sync.avatar_url)
        .bind(ts(at))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row_to_user(row)
    }

    #[instrument(skip(self))]
    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>> {
        sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE subject = ?1"))
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(row_to_user)
            .transpose()
    }

    #[instrument(skip(self, email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE \
             ORDER BY created_at LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(row_to_user)
        .transpose()
    }

    // =========================================================================
    // Files
    // =========================================================================

    #[instrument(skip(self, file), fields(file_id = %file.id))]
    async fn insert_file(&self, file: &File) -> Result<()> {
        let canvas_data = file.canvas_data.as_ref().map(to_json).transpose()?;
        sqlx::query(
            r#"
            INSERT INTO files (
                id, owner_id, name, file_type, canvas_data,
                last_edited_by, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(file.id.to_string())
        .bind(file.owner_id.to_string())
        .bind(&file.name)
        .bind(&file.file_type)
        .bind(canvas_data)
        .bind(file.last_edited_by.map(|id| id.to_string()))
        .bind(ts(file.created_at))
        .bind(ts(file.updated_at))
        .bind(file.deleted_at.map(ts))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        debug!("Created file {}", file.id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn file_grant(&self, file_id: Uuid, user_id: UserId) -> Result<Option<FileGrant>> {
        sqlx::query(&format!(
            r#"
            SELECT {FILE_COLUMNS},
                CASE
                    WHEN owner_id = ?1 THEN 'owner'
                    WHEN EXISTS (
                        SELECT 1 FROM collaborators c
                        WHERE c.file_id = files.id AND c.user_id = ?1
                    ) THEN 'collaborator'
                END AS role
            FROM files
            WHERE id = ?2
            "#
        ))
        .bind(user_id.to_string())
        .bind(file_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(row_to_grant)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn list_files(&self, user_id: UserId, query: FileQuery) -> Result<Vec<File>> {
        let sql = format!(
            "SELECT f.* FROM files f WHERE {} ORDER BY {}",
            view_filter(query.view),
            order_clause(query.order()),
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(row_to_file).collect()
    }

    #[instrument(skip(self, update))]
    async fn update_file(
        &self,
        file_id: Uuid,
        owner_id: UserId,
        update: &UpdateFile,
        at: DateTime<Utc>,
    ) -> Result<Option<File>> {
        let canvas_data = update.canvas_data.as_ref().map(to_json).transpose()?;
        let row = sqlx::query(&format!(
            r#"
            UPDATE files SET
                name = COALESCE(?3, name),
                canvas_data = COALESCE(?4, canvas_data),
                last_edited_by = ?2,
                updated_at = ?5
            WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL
            RETURNING {FILE_COLUMNS}
            "#
        ))
        .bind(file_id.to_string())
        .bind(owner_id.to_string())
        .bind(&update.name)
        .bind(canvas_data)
        .bind(ts(at))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(row_to_file).transpose()
    }

    #[instrument(skip(self))]
    async fn transition_file(
        &self,
        file_id: Uuid,
        owner_id: UserId,
        transition: Transition,
        at: DateTime<Utc>,
    ) -> Result<Option<File>> {
        let guard = guard_clause(transition.guard());
        let sql = match transition {
            Transition::Trash => format!(
                r#"
                UPDATE files SET deleted_at = ?3
                WHERE id = ?1 AND owner_id = ?2 {guard}
                RETURNING {FILE_COLUMNS}
                "#
            ),
            Transition::Restore => format!(
                r#"
                UPDATE files SET deleted_at = NULL, updated_at = ?3
                WHERE id = ?1 AND owner_id = ?2 {guard}
                RETURNING {FILE_COLUMNS}
                "#
            ),
            Transition::Purge => format!(
                r#"
                DELETE FROM files
                WHERE id = ?1 AND owner_id = ?2 {guard}
                RETURNING {FILE_COLUMNS}
                "#
            ),
        };

        let mut query = sqlx::query(&sql)
            .bind(file_id.to_string())
            .bind(owner_id.to_string());
        if transition != Transition::Purge {
            query = query.bind(ts(at));
        }

        let row = query.fetch_optional(&self.pool).await.map_err(db_err)?;
        let file = row.as_ref().map(row_to_file).transpose()?;
        debug!(applied = file.is_some(), "transition {} on {}", transition, file_id);
        Ok(file)
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_collaborators(&self, file_id: Uuid) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.subject, u.email, u.display_name, u.avatar_url,
                   u.created_at, u.updated_at
            FROM collaborators c
            JOIN users u ON u.id = c.user_id
            WHERE c.file_id = ?1
            ORDER BY c.created_at, u.email
            "#,
        )
        .bind(file_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(row_to_user).collect()
    }

    #[instrument(skip(self))]
    async fn add_collaborator(
        &self,
        file_id: Uuid,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO collaborators (file_id, user_id, created_at) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(file_id.to_string())
        .bind(user_id.to_string())
        .bind(ts(at))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn remove_collaborator(&self, file_id: Uuid, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM collaborators WHERE file_id = ?1 AND user_id = ?2")
            .bind(file_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Assets
    // =========================================================================

    #[instrument(skip(self, asset), fields(asset_id = %asset.id, file_id = %asset.file_id))]
    async fn insert_asset(
        &self,
        asset: &Asset,
        owner_id: UserId,
        limit: i64,
    ) -> Result<BoundedInsert> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO assets (
                id, file_id, name, file_type, storage_url, storage_key,
                file_size, thumbnail_url, metadata, created_at, updated_at
            )
            SELECT ?1, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11
            WHERE EXISTS (
                SELECT 1 FROM files
                WHERE id = ?3 AND owner_id = ?2 AND deleted_at IS NULL
            )
            AND (SELECT COUNT(*) FROM assets WHERE file_id = ?3) < ?12
            "#,
        )
        .bind(asset.id.to_string())
        .bind(owner_id.to_string())
        .bind(asset.file_id.to_string())
        .bind(&asset.name)
        .bind(&asset.file_type)
        .bind(&asset.storage_url)
        .bind(&asset.storage_key)
        .bind(asset.file_size)
        .bind(&asset.thumbnail_url)
        .bind(to_json(&asset.metadata)?)
        .bind(ts(asset.created_at))
        .bind(limit)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?
        .rows_affected();

        let outcome = if inserted > 0 {
            BoundedInsert::Inserted
        } else {
            let parent = sqlx::query(
                "SELECT 1 FROM files WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL",
            )
            .bind(asset.file_id.to_string())
            .bind(owner_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
            if parent.is_some() {
                BoundedInsert::AtCapacity
            } else {
                BoundedInsert::ParentUnavailable
            }
        };

        tx.commit().await.map_err(db_err)?;
        debug!(?outcome, "bounded asset insert");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn get_asset(&self, asset_id: Uuid) -> Result<Option<Asset>> {
        sqlx::query(&format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1"))
            .bind(asset_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(row_to_asset)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list_assets(&self, file_id: Uuid) -> Result<Vec<Asset>> {
        let rows = sqlx::query(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE file_id = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(file_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(row_to_asset).collect()
    }

    #[instrument(skip(self, update))]
    async fn update_asset(
        &self,
        asset_id: Uuid,
        owner_id: UserId,
        update: &UpdateAsset,
        at: DateTime<Utc>,
    ) -> Result<Option<Asset>> {
        let metadata = update.metadata.as_ref().map(to_json).transpose()?;
        sqlx::query(&format!(
            r#"
            UPDATE assets SET
                name = COALESCE(?3, name),
                thumbnail_url = COALESCE(?4, thumbnail_url),
                metadata = COALESCE(?5, metadata),
                updated_at = ?6
            WHERE id = ?1 AND {PARENT_WRITABLE}
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(asset_id.to_string())
        .bind(owner_id.to_string())
        .bind(&update.name)
        .bind(&update.thumbnail_url)
        .bind(metadata)
        .bind(ts(at))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(row_to_asset)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn delete_asset(&self, asset_id: Uuid, owner_id: UserId) -> Result<Option<Asset>> {
        sqlx::query(&format!(
            "DELETE FROM assets WHERE id = ?1 AND {PARENT_WRITABLE} RETURNING {ASSET_COLUMNS}"
        ))
        .bind(asset_id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(row_to_asset)
        .transpose()
    }

    // =========================================================================
    // Elements
    // =========================================================================

    #[instrument(skip(self, element), fields(element_id = %element.id, file_id = %element.file_id))]
    async fn insert_element(&self, element: &Element, owner_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO elements (
                id, file_id, element_type, props, sort_index, asset_id, created_at, updated_at
            )
            SELECT ?1, ?3, ?4, ?5, ?6, ?7, ?8, ?8
            WHERE EXISTS (
                SELECT 1 FROM files
                WHERE id = ?3 AND owner_id = ?2 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(element.id.to_string())
        .bind(owner_id.to_string())
        .bind(element.file_id.to_string())
        .bind(element.kind().as_str())
        .bind(element.props.to_value()?.to_string())
        .bind(element.sort_index)
        .bind(element.asset_id.map(|id| id.to_string()))
        .bind(ts(element.created_at))
        .execute(&self.pool)
        .await
        .map_err(placement_err)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn get_element(&self, element_id: Uuid) -> Result<Option<Element>> {
        sqlx::query(&format!("SELECT {ELEMENT_COLUMNS} FROM elements WHERE id = ?1"))
            .bind(element_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(row_to_element)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list_elements(&self, file_id: Uuid) -> Result<Vec<Element>> {
        let rows = sqlx::query(&format!(
            "SELECT {ELEMENT_COLUMNS} FROM elements WHERE file_id = ?1 ORDER BY rowid"
        ))
        .bind(file_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(row_to_element).collect()
    }

    #[instrument(skip(self, changes))]
    async fn update_element(
        &self,
        element_id: Uuid,
        owner_id: UserId,
        changes: &ElementChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Element>> {
        let props = changes
            .props
            .as_ref()
            .map(|p| p.to_value().map(|v| v.to_string()))
            .transpose()?;
        let asset_id = changes
            .props
            .as_ref()
            .and_then(|p| p.asset_id())
            .map(|id| id.to_string());

        sqlx::query(&format!(
            r#"
            UPDATE elements SET
                sort_index = COALESCE(?3, sort_index),
                props = COALESCE(?4, props),
                asset_id = CASE WHEN ?4 IS NULL THEN asset_id ELSE ?5 END,
                updated_at = ?6
            WHERE id = ?1 AND {PARENT_WRITABLE}
            RETURNING {ELEMENT_COLUMNS}
            "#
        ))
        .bind(element_id.to_string())
        .bind(owner_id.to_string())
        .bind(changes.sort_index)
        .bind(props)
        .bind(asset_id)
        .bind(ts(at))
        .fetch_optional(&self.pool)
        .await
        .map_err(placement_err)?
        .map(row_to_element)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn delete_element(&self, element_id: Uuid, owner_id: UserId) -> Result<Option<Element>> {
        sqlx::query(&format!(
            "DELETE FROM elements WHERE id = ?1 AND {PARENT_WRITABLE} RETURNING {ELEMENT_COLUMNS}"
        ))
        .bind(element_id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(row_to_element)
        .transpose()
    }
}
