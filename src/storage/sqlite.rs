//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait,
//! plus run bookkeeping and the workflow-flag updates used downstream.

use crate::output::OutcomeCounters;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{IdentityKey, LectureRecord, RunRecord, RunStatus};
use crate::HarvestError;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// Storage format of the lecture day
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const LECTURE_COLUMNS: &str = "identity_key, source, content_hash, scraped, title, type_title, lesson_type,
     lecturer, function, date, start_time, end_time, duration_sec, audio_link, language,
     chair, video_link, scheduled, converted";

const RUN_COLUMNS: &str = "id, project_id, started_at, finished_at, config_hash, status,
     no_audio, missing_key_field, disallowed, already_present, overwritten, no_duration, saved";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (dry runs and tests)
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===== Run Management =====

    /// Creates a new harvest run in the `running` state
    pub fn create_run(&mut self, project_id: &str, config_hash: Option<&str>) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (project_id, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![project_id, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Closes a run with its final status and outcome counts
    pub fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        outcomes: &OutcomeCounters,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, no_audio = ?3, missing_key_field = ?4,
             disallowed = ?5, already_present = ?6, overwritten = ?7, no_duration = ?8, saved = ?9
             WHERE id = ?10",
            params![
                status.to_db_string(),
                now,
                outcomes.no_audio as i64,
                outcomes.missing_key_field as i64,
                outcomes.disallowed as i64,
                outcomes.already_present as i64,
                outcomes.overwritten as i64,
                outcomes.no_duration as i64,
                outcomes.saved as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    /// Gets the most recent run
    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], run_from_row).optional()?)
    }

    // ===== Workflow Flags =====

    /// Marks a record as queued for conversion
    ///
    /// Returns false if no record is stored under `key`.
    pub fn mark_scheduled(&mut self, key: &IdentityKey) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE lectures SET scheduled = 1 WHERE identity_key = ?1",
            params![key.as_str()],
        )?;
        Ok(updated > 0)
    }

    /// Marks a record as converted, protecting it from overwrites
    ///
    /// Returns false if no record is stored under `key`.
    pub fn mark_converted(&mut self, key: &IdentityKey) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE lectures SET converted = 1 WHERE identity_key = ?1",
            params![key.as_str()],
        )?;
        Ok(updated > 0)
    }

    // ===== Statistics =====

    pub fn count_records(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM lectures")
    }

    pub fn count_converted(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM lectures WHERE converted = 1")
    }

    pub fn count_scheduled(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM lectures WHERE scheduled = 1")
    }

    /// Counts stored records per language code
    pub fn count_by_language(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT language, COUNT(*) FROM lectures GROUP BY language")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (language, count) = row?;
            counts.insert(language, count as u64);
        }
        Ok(counts)
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl RecordStore for SqliteStorage {
    fn get(&self, key: &IdentityKey) -> StorageResult<Option<LectureRecord>> {
        let sql = format!("SELECT {} FROM lectures WHERE identity_key = ?1", LECTURE_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![key.as_str()], LectureRow::from_row)
            .optional()?;

        row.map(LectureRow::into_record).transpose()
    }

    fn put(&mut self, record: &LectureRecord) -> StorageResult<()> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO lectures ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                LECTURE_COLUMNS
            ),
            params![
                record.key.as_str(),
                record.source,
                record.content_hash,
                record.scraped.to_rfc3339(),
                record.title,
                record.type_title,
                record.lesson_type,
                record.lecturer,
                record.function,
                record.date.format(DATE_FORMAT).to_string(),
                record.start_time,
                record.end_time,
                record.duration_sec,
                record.audio_link,
                record.language,
                record.chair,
                record.video_link,
                record.scheduled,
                record.converted,
            ],
        )?;
        Ok(())
    }
}

/// Raw column values of a `lectures` row, before timestamp decoding
struct LectureRow {
    key: String,
    source: String,
    content_hash: Vec<u8>,
    scraped: String,
    title: Option<String>,
    type_title: Option<String>,
    lesson_type: Option<String>,
    lecturer: String,
    function: Option<String>,
    date: String,
    start_time: String,
    end_time: String,
    duration_sec: u32,
    audio_link: String,
    language: String,
    chair: Option<String>,
    video_link: Option<String>,
    scheduled: bool,
    converted: bool,
}

impl LectureRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            source: row.get(1)?,
            content_hash: row.get(2)?,
            scraped: row.get(3)?,
            title: row.get(4)?,
            type_title: row.get(5)?,
            lesson_type: row.get(6)?,
            lecturer: row.get(7)?,
            function: row.get(8)?,
            date: row.get(9)?,
            start_time: row.get(10)?,
            end_time: row.get(11)?,
            duration_sec: row.get(12)?,
            audio_link: row.get(13)?,
            language: row.get(14)?,
            chair: row.get(15)?,
            video_link: row.get(16)?,
            scheduled: row.get(17)?,
            converted: row.get(18)?,
        })
    }

    fn into_record(self) -> StorageResult<LectureRecord> {
        let scraped = DateTime::parse_from_rfc3339(&self.scraped)
            .map_err(|e| StorageError::Corrupt {
                key: self.key.clone(),
                message: format!("bad scrape timestamp '{}': {}", self.scraped, e),
            })?
            .with_timezone(&Utc);

        let date = NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            StorageError::Corrupt {
                key: self.key.clone(),
                message: format!("bad date '{}': {}", self.date, e),
            }
        })?;

        Ok(LectureRecord {
            key: IdentityKey::from_stored(self.key),
            source: self.source,
            content_hash: self.content_hash,
            scraped,
            title: self.title,
            type_title: self.type_title,
            lesson_type: self.lesson_type,
            lecturer: self.lecturer,
            function: self.function,
            date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_sec: self.duration_sec,
            audio_link: self.audio_link,
            language: self.language,
            chair: self.chair,
            video_link: self.video_link,
            scheduled: self.scheduled,
            converted: self.converted,
        })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
        outcomes: OutcomeCounters {
            no_audio: row.get::<_, i64>(6)? as u64,
            missing_key_field: row.get::<_, i64>(7)? as u64,
            disallowed: row.get::<_, i64>(8)? as u64,
            already_present: row.get::<_, i64>(9)? as u64,
            overwritten: row.get::<_, i64>(10)? as u64,
            no_duration: row.get::<_, i64>(11)? as u64,
            saved: row.get::<_, i64>(12)? as u64,
        },
    })
}
