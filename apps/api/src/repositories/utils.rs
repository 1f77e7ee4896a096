//! Shared SQL fragments and error helpers for repositories

use uuid::Uuid;

/// SQL columns for playlist item queries
pub const PLAYLIST_ITEM_COLUMNS: &str = r#"
    id, playlist_id, sequence, title, video_id, created_at
"#;

/// SQL columns for loading a playlist joined with its items
///
/// Item columns are aliased and nullable because a playlist without items
/// still yields one row from the LEFT JOIN.
pub const PLAYLIST_WITH_ITEMS_COLUMNS: &str = r#"
    p.id, p.title, p.created_at, p.updated_at,
    i.id AS item_id, i.sequence AS item_sequence, i.title AS item_title,
    i.video_id AS item_video_id, i.created_at AS item_created_at
"#;

/// PostgreSQL SQLSTATE for unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign_key_violation
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Return the SQLSTATE code of a database error, if it carries one
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Key value named by a constraint violation's detail text
///
/// PostgreSQL reports the offending row as `Key (column)=(value) ...`.
pub fn violating_key(err: &sqlx::Error) -> Option<Uuid> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let pg_err = db_err.try_downcast_ref::<sqlx::postgres::PgDatabaseError>()?;
    pg_err.detail().and_then(key_from_detail)
}

fn key_from_detail(detail: &str) -> Option<Uuid> {
    let start = detail.find(")=(")? + 3;
    let len = detail[start..].find(')')?;
    detail[start..start + len].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_of_non_database_error() {
        assert_eq!(sqlstate(&sqlx::Error::RowNotFound), None);
    }

    #[test]
    fn test_join_columns_alias_item_fields() {
        for alias in ["item_id", "item_sequence", "item_title", "item_video_id"] {
            assert!(PLAYLIST_WITH_ITEMS_COLUMNS.contains(alias));
        }
    }

    #[test]
    fn test_key_from_foreign_key_detail() {
        let id = Uuid::new_v4();
        let detail = format!(
            "Key (playlist_id)=({}) is not present in table \"playlists\".",
            id
        );
        assert_eq!(key_from_detail(&detail), Some(id));
    }

    #[test]
    fn test_key_from_unique_detail() {
        let id = Uuid::new_v4();
        let detail = format!("Key (id)=({}) already exists.", id);
        assert_eq!(key_from_detail(&detail), Some(id));
    }

    #[test]
    fn test_key_from_unexpected_detail() {
        assert_eq!(key_from_detail("Failing row contains (null)."), None);
        assert_eq!(key_from_detail("Key (id)=(not-a-uuid) already exists."), None);
        assert_eq!(violating_key(&sqlx::Error::RowNotFound), None);
    }
}
