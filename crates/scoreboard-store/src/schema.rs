/// SQL DDL for the score database.
/// Column names follow the on-disk layout of existing `GameData.db` files.
pub const SCHEMA_VERSION: u32 = 1;

pub const TABLE: &str = "HighScore";

/// Level assigned when a caller does not name one.
pub const DEFAULT_LEVEL: &str = "Default";

// AUTOINCREMENT keeps ids from being reused after a bulk clear.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS HighScore (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    playerName TEXT NOT NULL,
    score INTEGER NOT NULL,
    levelName TEXT NOT NULL DEFAULT 'Default',
    createdAt TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_highscore_rank ON HighScore(score DESC, id ASC);
CREATE INDEX IF NOT EXISTS idx_highscore_level ON HighScore(levelName, score DESC, id ASC);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub fn pragmas(busy_timeout_ms: u32) -> String {
    format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = {busy_timeout_ms};
         PRAGMA synchronous = NORMAL;"
    )
}
