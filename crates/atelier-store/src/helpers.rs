//! Row conversion helpers

use atelier_core::access::{FileGrant, Role};
use atelier_core::model::{
    Asset, CanvasData, Element, ElementKind, ElementProps, File, RawProps, User,
};
use atelier_core::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

pub(crate) const USER_COLUMNS: &str =
    "id, subject, email, display_name, avatar_url, created_at, updated_at";

pub(crate) const FILE_COLUMNS: &str = "id, owner_id, name, file_type, canvas_data, \
     last_edited_by, created_at, updated_at, deleted_at";

pub(crate) const ASSET_COLUMNS: &str = "id, file_id, name, file_type, storage_url, storage_key, \
     file_size, thumbnail_url, metadata, created_at, updated_at";

pub(crate) const ELEMENT_COLUMNS: &str =
    "id, file_id, element_type, props, sort_index, asset_id, created_at, updated_at";

/// Map a driver error into the core taxonomy
pub(crate) fn db_err(err: sqlx::Error) -> Error {
    Error::Database(err.to_string())
}

/// Like [`db_err`], but a dangling `asset_id` is the caller's mistake
pub(crate) fn placement_err(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Error::invalid_field("props.asset_id", "Asset not found in this file")
        }
        other => db_err(other),
    }
}

/// Fixed-width RFC 3339 so text order matches time order
pub(crate) fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Serialization(format!("invalid timestamp: {e}")))
}

fn parse_uuid(s: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(s).map_err(|e| Error::Serialization(format!("invalid uuid: {e}")))
}

fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>, Error> {
    s.as_deref().map(parse_uuid).transpose()
}

/// Convert a SQLite row to a User
pub(crate) fn row_to_user(row: SqliteRow) -> Result<User, Error> {
    let id_str: String = row.get("id");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(User {
        id: parse_uuid(&id_str)?,
        subject: row.get("subject"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
    })
}

/// Convert a SQLite row to a File
pub(crate) fn row_to_file(row: &SqliteRow) -> Result<File, Error> {
    let id_str: String = row.get("id");
    let owner_id_str: String = row.get("owner_id");
    let canvas_data_str: Option<String> = row.get("canvas_data");
    let last_edited_by_str: Option<String> = row.get("last_edited_by");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");
    let deleted_at_str: Option<String> = row.get("deleted_at");

    let canvas_data = canvas_data_str
        .map(|s| serde_json::from_str::<CanvasData>(&s))
        .transpose()
        .map_err(|e| Error::Serialization(format!("invalid canvas data: {e}")))?;

    Ok(File {
        id: parse_uuid(&id_str)?,
        owner_id: parse_uuid(&owner_id_str)?,
        name: row.get("name"),
        file_type: row.get("file_type"),
        canvas_data,
        last_edited_by: parse_opt_uuid(last_edited_by_str)?,
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
        deleted_at: deleted_at_str.as_deref().map(parse_ts).transpose()?,
    })
}

/// Convert a SQLite row carrying a `role` column to a FileGrant
pub(crate) fn row_to_grant(row: SqliteRow) -> Result<FileGrant, Error> {
    let file = row_to_file(&row)?;
    let role: Option<String> = row.get("role");
    let role = match role.as_deref() {
        Some("owner") => Some(Role::Owner),
        Some("collaborator") => Some(Role::Collaborator),
        _ => None,
    };
    Ok(FileGrant { file, role })
}

/// Convert a SQLite row to an Asset
pub(crate) fn row_to_asset(row: SqliteRow) -> Result<Asset, Error> {
    let id_str: String = row.get("id");
    let file_id_str: String = row.get("file_id");
    let metadata_str: String = row.get("metadata");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let metadata: Map<String, Value> = serde_json::from_str(&metadata_str)
        .map_err(|e| Error::Serialization(format!("invalid json: {e}")))?;

    Ok(Asset {
        id: parse_uuid(&id_str)?,
        file_id: parse_uuid(&file_id_str)?,
        name: row.get("name"),
        file_type: row.get("file_type"),
        storage_url: row.get("storage_url"),
        storage_key: row.get("storage_key"),
        file_size: row.get("file_size"),
        thumbnail_url: row.get("thumbnail_url"),
        metadata,
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
    })
}

/// Convert a SQLite row to an Element
pub(crate) fn row_to_element(row: SqliteRow) -> Result<Element, Error> {
    let id_str: String = row.get("id");
    let file_id_str: String = row.get("file_id");
    let kind_str: String = row.get("element_type");
    let props_str: String = row.get("props");
    let asset_id_str: Option<String> = row.get("asset_id");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let kind: ElementKind = kind_str.parse().map_err(Error::Serialization)?;
    let raw: Value = serde_json::from_str(&props_str)
        .map_err(|e| Error::Serialization(format!("invalid json: {e}")))?;
    let props = ElementProps::parse(kind, RawProps(raw))
        .map_err(|e| Error::Serialization(format!("stored props no longer valid: {e}")))?;

    Ok(Element {
        id: parse_uuid(&id_str)?,
        file_id: parse_uuid(&file_id_str)?,
        props,
        sort_index: row.get("sort_index"),
        asset_id: parse_opt_uuid(asset_id_str)?,
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
    })
}
