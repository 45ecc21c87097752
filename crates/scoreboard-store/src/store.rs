use std::path::Path;

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::config::StoreConfig;
use crate::database::Database;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot, FailureKind};
use crate::error::StoreError;
use crate::record::{ScoreRecord, COLUMNS};
use crate::schema::{DEFAULT_LEVEL, TABLE};

pub const DEFAULT_LIMIT: i64 = 10;

/// Leaderboard storage over one SQLite file.
///
/// Every operation has two forms. `try_*` methods return the storage error.
/// The plain methods log the failure, record it in [`Diagnostics`], and
/// return a degraded value (nothing inserted, empty list, zero).
pub struct ScoreStore {
    db: Database,
    diagnostics: Diagnostics,
}

impl ScoreStore {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::with_database(Database::open(config)?))
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::with_database(Database::in_memory()?))
    }

    /// Wrap an already-open database. The store closes it when dropped,
    /// including for any other clones of `db`.
    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    pub fn is_open(&self) -> bool {
        self.db.is_open()
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    pub fn reset_diagnostics(&self) {
        self.diagnostics.reset();
    }

    /// Release the connection. Safe to call more than once.
    pub fn close(&self) {
        let _ = self.db.close();
    }

    // ── Inserts ─────────────────────────────────────────────────────────

    /// Insert a score. Level defaults to `"Default"` when `None`.
    #[instrument(skip(self))]
    pub fn try_add_high_score(
        &self,
        player_name: &str,
        score: i64,
        level_name: Option<&str>,
    ) -> Result<ScoreRecord, StoreError> {
        let level_name = level_name.unwrap_or(DEFAULT_LEVEL);
        let created_at = Utc::now();

        let id = self.db.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {TABLE} (playerName, score, levelName, createdAt) VALUES (?1, ?2, ?3, ?4)"
                ),
                rusqlite::params![player_name, score, level_name, created_at.to_rfc3339()],
            )
            .map_err(StoreError::write)?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(id, player_name, score, level_name, "high score added");

        Ok(ScoreRecord {
            id,
            player_name: player_name.to_string(),
            score,
            level_name: level_name.to_string(),
            created_at,
        })
    }

    pub fn add_high_score(&self, player_name: &str, score: i64, level_name: Option<&str>) {
        if let Err(e) = self.try_add_high_score(player_name, score, level_name) {
            self.report("add_high_score", FailureKind::Write, &e);
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Best `limit` scores overall, highest first, earlier insert first on ties.
    #[instrument(skip(self))]
    pub fn try_top_high_scores(&self, limit: i64) -> Result<Vec<ScoreRecord>, StoreError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM {TABLE} ORDER BY score DESC, id ASC LIMIT ?1"
                ))
                .map_err(StoreError::read)?;
            let mut rows = stmt.query([limit]).map_err(StoreError::read)?;
            collect_records(&mut rows)
        })
    }

    pub fn top_high_scores(&self, limit: i64) -> Vec<ScoreRecord> {
        self.try_top_high_scores(limit)
            .unwrap_or_else(|e| self.degrade("top_high_scores", &e))
    }

    /// Same ordering as [`Self::try_top_high_scores`], restricted to one level.
    /// Level names match exactly.
    #[instrument(skip(self))]
    pub fn try_high_scores_for_level(
        &self,
        level_name: &str,
        limit: i64,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM {TABLE} WHERE levelName = ?1
                     ORDER BY score DESC, id ASC LIMIT ?2"
                ))
                .map_err(StoreError::read)?;
            let mut rows = stmt
                .query(rusqlite::params![level_name, limit])
                .map_err(StoreError::read)?;
            collect_records(&mut rows)
        })
    }

    pub fn high_scores_for_level(&self, level_name: &str, limit: i64) -> Vec<ScoreRecord> {
        self.try_high_scores_for_level(level_name, limit)
            .unwrap_or_else(|e| self.degrade("high_scores_for_level", &e))
    }

    #[instrument(skip(self))]
    pub fn try_high_score_count(&self) -> Result<u64, StoreError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
                    row.get(0)
                })
                .map_err(StoreError::read)?;
            Ok(count as u64)
        })
    }

    pub fn high_score_count(&self) -> u64 {
        self.try_high_score_count()
            .unwrap_or_else(|e| self.degrade("high_score_count", &e))
    }

    // ── Bulk clear ──────────────────────────────────────────────────────

    /// Delete every score. Returns how many rows were removed.
    #[instrument(skip(self))]
    pub fn try_clear_all_high_scores(&self) -> Result<usize, StoreError> {
        let removed = self.db.with_conn(|conn| {
            conn.execute(&format!("DELETE FROM {TABLE}"), [])
                .map_err(StoreError::write)
        })?;
        info!(removed, "all high scores cleared");
        Ok(removed)
    }

    pub fn clear_all_high_scores(&self) {
        if let Err(e) = self.try_clear_all_high_scores() {
            self.report("clear_all_high_scores", FailureKind::Write, &e);
        }
    }

    // ── Failure reporting ───────────────────────────────────────────────

    fn report(&self, operation: &'static str, kind: FailureKind, e: &StoreError) {
        error!(operation, error = %e, error_kind = e.kind(), path = %self.path().display(), "score store operation failed");
        self.diagnostics.record(operation, kind, e);
    }

    fn degrade<T: Default>(&self, operation: &'static str, e: &StoreError) -> T {
        self.report(operation, FailureKind::Read, e);
        T::default()
    }
}

impl Drop for ScoreStore {
    fn drop(&mut self) {
        self.close();
    }
}

fn collect_records(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<ScoreRecord>, StoreError> {
    let mut results = Vec::new();
    while let Some(row) = rows.next().map_err(StoreError::read)? {
        results.push(ScoreRecord::from_row(row)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_store() -> ScoreStore {
        ScoreStore::in_memory().unwrap()
    }

    fn names(records: &[ScoreRecord]) -> Vec<&str> {
        records.iter().map(|r| r.player_name.as_str()).collect()
    }

    fn seed(store: &ScoreStore) {
        store.add_high_score("Ann", 100, Some("L1"));
        store.add_high_score("Bo", 150, Some("L1"));
        store.add_high_score("Cy", 150, Some("L2"));
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = test_store();
        let a = store.try_add_high_score("Ann", 100, None).unwrap();
        let b = store.try_add_high_score("Bo", 50, None).unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.level_name, "Default");
    }

    #[test]
    fn top_scores_break_ties_by_insertion() {
        let store = test_store();
        seed(&store);
        let top = store.top_high_scores(DEFAULT_LIMIT);
        assert_eq!(names(&top), vec!["Bo", "Cy", "Ann"]);
    }

    #[test]
    fn level_filter() {
        let store = test_store();
        seed(&store);
        let l1 = store.high_scores_for_level("L1", DEFAULT_LIMIT);
        assert_eq!(names(&l1), vec!["Bo", "Ann"]);
        assert!(l1.iter().all(|r| r.level_name == "L1"));
    }

    #[test]
    fn level_filter_is_case_sensitive() {
        let store = test_store();
        seed(&store);
        assert!(store.high_scores_for_level("l1", DEFAULT_LIMIT).is_empty());
        assert!(store.high_scores_for_level("Unknown", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn non_positive_limit_is_empty() {
        let store = test_store();
        seed(&store);
        assert!(store.top_high_scores(0).is_empty());
        assert!(store.top_high_scores(-5).is_empty());
        assert!(store.high_scores_for_level("L1", 0).is_empty());
        assert!(store.diagnostics().is_healthy());
    }

    #[test]
    fn limit_truncates() {
        let store = test_store();
        seed(&store);
        assert_eq!(names(&store.top_high_scores(2)), vec!["Bo", "Cy"]);
    }

    #[test]
    fn negative_scores_rank_below_zero() {
        let store = test_store();
        store.add_high_score("neg", -10, None);
        store.add_high_score("zero", 0, None);
        assert_eq!(names(&store.top_high_scores(10)), vec!["zero", "neg"]);
    }

    #[test]
    fn stored_record_matches_returned_record() {
        let store = test_store();
        let inserted = store.try_add_high_score("Ann", 42, Some("L9")).unwrap();
        let fetched = store.top_high_scores(1);
        assert_eq!(fetched, vec![inserted]);
    }

    #[test]
    fn count_and_clear() {
        let store = test_store();
        seed(&store);
        assert_eq!(store.high_score_count(), 3);
        assert_eq!(store.try_clear_all_high_scores().unwrap(), 3);
        assert_eq!(store.high_score_count(), 0);
        assert!(store.top_high_scores(10).is_empty());
        assert!(store.high_scores_for_level("L1", 10).is_empty());
        assert_eq!(store.try_clear_all_high_scores().unwrap(), 0);
        assert!(store.diagnostics().is_healthy());
    }

    #[test]
    fn ids_not_reused_after_clear() {
        let store = test_store();
        let first = store.try_add_high_score("Ann", 1, None).unwrap();
        store.clear_all_high_scores();
        let second = store.try_add_high_score("Bo", 1, None).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn closed_store_degrades() {
        let store = test_store();
        seed(&store);
        store.close();
        store.close();
        assert!(!store.is_open());

        store.add_high_score("late", 1, None);
        assert!(store.top_high_scores(10).is_empty());
        assert!(store.high_scores_for_level("L1", 10).is_empty());
        assert_eq!(store.high_score_count(), 0);
        store.clear_all_high_scores();

        let diag = store.diagnostics();
        assert_eq!(diag.write_failures, 2);
        assert_eq!(diag.read_failures, 3);
        assert_eq!(diag.last_failure.unwrap().operation, "clear_all_high_scores");

        assert_matches!(store.try_high_score_count(), Err(StoreError::Closed));
        assert_matches!(
            store.try_add_high_score("late", 1, None),
            Err(StoreError::Closed)
        );
    }

    #[test]
    fn corrupt_timestamp_is_a_read_error() {
        let store = test_store();
        store
            .db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO HighScore (playerName, score, levelName, createdAt) VALUES ('x', 1, 'Default', 'yesterday')",
                    [],
                )
                .map_err(StoreError::write)
            })
            .unwrap();

        assert_matches!(store.try_top_high_scores(10), Err(StoreError::Read(_)));
        assert!(store.top_high_scores(10).is_empty());
        assert_eq!(store.diagnostics().read_failures, 1);
        // Count does not decode rows, so it still sees the row.
        assert_eq!(store.high_score_count(), 1);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        {
            let store = ScoreStore::open(&config).unwrap();
            seed(&store);
        }
        let store = ScoreStore::open(&config).unwrap();
        assert_eq!(store.high_score_count(), 3);
        assert_eq!(store.path(), config.database_path());
    }
}
