use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One persisted leaderboard entry.
///
/// Values are created by [`crate::ScoreStore::try_add_high_score`] and never
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: i64,
    pub player_name: String,
    pub score: i64,
    pub level_name: String,
    pub created_at: DateTime<Utc>,
}

pub(crate) const COLUMNS: &str = "id, playerName, score, levelName, createdAt";

impl ScoreRecord {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> Result<Self, StoreError> {
        let created_at: String = row.get(4).map_err(StoreError::read)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::Read(format!("invalid createdAt {created_at:?}: {e}")))?
            .with_timezone(&Utc);

        Ok(Self {
            id: row.get(0).map_err(StoreError::read)?,
            player_name: row.get(1).map_err(StoreError::read)?,
            score: row.get(2).map_err(StoreError::read)?,
            level_name: row.get(3).map_err(StoreError::read)?,
            created_at,
        })
    }
}

impl std::fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) [{}]", self.player_name, self.score, self.level_name)
    }
}
