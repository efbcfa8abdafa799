//! Read and update operations for [`Profile`] records.
//!
//! There is deliberately no `create_profile` or `delete_profile` here:
//! profiles come into existence with their user (see
//! [`Database::create_user`]) and leave only through the user-delete
//! cascade.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Profile, ProfileRecord};
use crate::row;

const SELECT_COLS: &str = "p.id, p.owner_id, p.name, p.content, p.image,
             p.created_at, p.updated_at, u.username";

impl Database {
    /// Fetch the profile owned by `owner_id`.
    pub fn get_profile(&self, owner_id: Uuid) -> Result<ProfileRecord> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {SELECT_COLS}
                     FROM profiles p JOIN users u ON u.id = p.owner_id
                     WHERE p.owner_id = ?1"
                ),
                params![owner_id.to_string()],
                row_to_profile_record,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all profiles, newest first.
    pub fn list_profiles(&self) -> Result<Vec<ProfileRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {SELECT_COLS}
             FROM profiles p JOIN users u ON u.id = p.owner_id
             ORDER BY p.created_at DESC"
        ))?;
        let rows = stmt.query_map([], row_to_profile_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Update the profile owned by `owner_id`.  `image` keeps its current
    /// value when `None`.
    pub fn update_profile(
        &self,
        owner_id: Uuid,
        name: Option<&str>,
        content: Option<&str>,
        image: Option<&str>,
    ) -> Result<ProfileRecord> {
        let affected = self.conn().execute(
            "UPDATE profiles
             SET name = ?2, content = ?3, image = COALESCE(?4, image), updated_at = ?5
             WHERE owner_id = ?1",
            params![
                owner_id.to_string(),
                name,
                content,
                image,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_profile(owner_id)
    }
}

fn row_to_profile_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProfileRecord> {
    Ok(ProfileRecord {
        profile: Profile {
            id: row::uuid_col(row, 0)?,
            owner_id: row::uuid_col(row, 1)?,
            name: row.get(2)?,
            content: row.get(3)?,
            image: row.get(4)?,
            created_at: row::timestamp_col(row, 5)?,
            updated_at: row::timestamp_col(row, 6)?,
        },
        owner_username: row.get(7)?,
    })
}
