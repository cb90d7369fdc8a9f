//! SQLite-based storage implementation

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use burnout_core::{Channel, Level, SessionId};

use super::{
    AssessmentRecord, OtpRecord, OtpWrite, Progress, ReportRecord, SessionRecord, Store,
    StoreResult,
};
use crate::error::ServerError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

fn internal(e: impl std::fmt::Display) -> ServerError {
    ServerError::Internal(e.to_string())
}

/// Fixed-width UTC timestamps so text comparison matches time order
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_level(s: &str) -> Level {
    match s {
        "Low" => Level::Low,
        "Moderate" => Level::Moderate,
        _ => Level::High,
    }
}

/// Column conversion failure for values the schema should never hold
fn invalid_column(index: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        format!("unexpected value {:?}", value).into(),
    )
}

fn read_otp(conn: &Connection, id: &SessionId, channel: Channel) -> StoreResult<Option<OtpRecord>> {
    conn.query_row(
        "SELECT code, target, verified, attempts, resend_count, created_at
         FROM otps WHERE session_id = ?1 AND channel = ?2",
        params![id.as_str(), channel.as_str()],
        |row| {
            let created_at: String = row.get(5)?;
            Ok(OtpRecord {
                session_id: id.clone(),
                channel,
                code: row.get(0)?,
                target: row.get(1)?,
                verified: row.get(2)?,
                attempts: row.get(3)?,
                resend_count: row.get(4)?,
                created_at: parse_timestamp(&created_at),
            })
        },
    )
    .optional()
    .map_err(internal)
}

/// SQLite-backed store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ServerError> {
        let conn = Connection::open(path).map_err(internal)?;

        // Owned records are removed with their session
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(internal)?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ServerError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(internal)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    pub fn get_schema_version(conn: &Connection) -> Result<i32, ServerError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(internal)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(internal)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ServerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                mobile TEXT NOT NULL,
                email_verified INTEGER NOT NULL DEFAULT 0,
                mobile_verified INTEGER NOT NULL DEFAULT 0,
                assessment_completed INTEGER NOT NULL DEFAULT 0,
                payment_completed INTEGER NOT NULL DEFAULT 0,
                report_generated INTEGER NOT NULL DEFAULT 0,
                step TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON sessions(created_at);

            -- One live code per session and channel
            CREATE TABLE IF NOT EXISTS otps (
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                channel TEXT NOT NULL,
                code TEXT NOT NULL,
                target TEXT NOT NULL,
                verified INTEGER NOT NULL DEFAULT 0,
                attempts INTEGER NOT NULL DEFAULT 0,
                resend_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                PRIMARY KEY (session_id, channel)
            );

            CREATE TABLE IF NOT EXISTS assessments (
                session_id TEXT PRIMARY KEY REFERENCES sessions(id) ON DELETE CASCADE,
                answers TEXT NOT NULL,
                score INTEGER NOT NULL,
                level TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reports (
                session_id TEXT PRIMARY KEY REFERENCES sessions(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                email_sent INTEGER NOT NULL DEFAULT 0,
                email_sent_at TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(internal)?;

        Ok(())
    }

    fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
        let step: String = row.get(9)?;
        let created_at: String = row.get(10)?;
        Ok(SessionRecord {
            id: SessionId(row.get(0)?),
            full_name: row.get(1)?,
            email: row.get(2)?,
            mobile: row.get(3)?,
            email_verified: row.get(4)?,
            mobile_verified: row.get(5)?,
            assessment_completed: row.get(6)?,
            payment_completed: row.get(7)?,
            report_generated: row.get(8)?,
            step: Progress::from_str(&step).ok_or_else(|| invalid_column(9, &step))?,
            created_at: parse_timestamp(&created_at),
        })
    }
}

impl Store for SqliteStore {
    fn create_session(&self, session: &SessionRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO sessions (id, full_name, email, mobile, email_verified, mobile_verified,
                assessment_completed, payment_completed, report_generated, step, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                session.id.as_str(),
                session.full_name,
                session.email,
                session.mobile,
                session.email_verified,
                session.mobile_verified,
                session.assessment_completed,
                session.payment_completed,
                session.report_generated,
                session.step.as_str(),
                timestamp(&session.created_at),
            ],
        )
        .map_err(internal)?;

        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, full_name, email, mobile, email_verified, mobile_verified,
                assessment_completed, payment_completed, report_generated, step, created_at
             FROM sessions WHERE id = ?1",
            params![id.as_str()],
            Self::session_from_row,
        )
        .optional()
        .map_err(internal)
    }

    fn update_session(&self, session: &SessionRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE sessions SET email_verified = ?2, mobile_verified = ?3,
                    assessment_completed = ?4, payment_completed = ?5, report_generated = ?6,
                    step = ?7
                 WHERE id = ?1",
                params![
                    session.id.as_str(),
                    session.email_verified,
                    session.mobile_verified,
                    session.assessment_completed,
                    session.payment_completed,
                    session.report_generated,
                    session.step.as_str(),
                ],
            )
            .map_err(internal)?;

        if rows == 0 {
            return Err(ServerError::SessionNotFound);
        }
        Ok(())
    }

    fn update_otp<T, F>(&self, id: &SessionId, channel: Channel, update: F) -> StoreResult<T>
    where
        F: FnOnce(Option<&OtpRecord>) -> (OtpWrite, T),
    {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(internal)?;

        let current = read_otp(&tx, id, channel)?;
        let (write, result) = update(current.as_ref());

        match write {
            OtpWrite::Keep => {}
            OtpWrite::Put(otp) => {
                tx.execute(
                    "INSERT OR REPLACE INTO otps
                        (session_id, channel, code, target, verified, attempts, resend_count, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        id.as_str(),
                        channel.as_str(),
                        otp.code,
                        otp.target,
                        otp.verified,
                        otp.attempts,
                        otp.resend_count,
                        timestamp(&otp.created_at),
                    ],
                )
                .map_err(internal)?;
            }
            OtpWrite::Remove => {
                tx.execute(
                    "DELETE FROM otps WHERE session_id = ?1 AND channel = ?2",
                    params![id.as_str(), channel.as_str()],
                )
                .map_err(internal)?;
            }
        }

        tx.commit().map_err(internal)?;
        Ok(result)
    }

    fn get_otp(&self, id: &SessionId, channel: Channel) -> StoreResult<Option<OtpRecord>> {
        let conn = self.conn.lock().unwrap();
        read_otp(&conn, id, channel)
    }

    fn put_assessment(&self, assessment: &AssessmentRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let answers = serde_json::to_string(&assessment.answers).map_err(internal)?;

        conn.execute(
            "INSERT OR REPLACE INTO assessments (session_id, answers, score, level, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                assessment.session_id.as_str(),
                answers,
                assessment.score,
                assessment.level.as_str(),
                timestamp(&assessment.created_at),
            ],
        )
        .map_err(internal)?;

        Ok(())
    }

    fn get_assessment(&self, id: &SessionId) -> StoreResult<Option<AssessmentRecord>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT answers, score, level, created_at FROM assessments WHERE session_id = ?1",
                params![id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u8>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(internal)?;

        let Some((answers, score, level, created_at)) = row else {
            return Ok(None);
        };

        let answers: BTreeMap<u8, String> = serde_json::from_str(&answers).map_err(internal)?;

        Ok(Some(AssessmentRecord {
            session_id: id.clone(),
            answers,
            score,
            level: parse_level(&level),
            created_at: parse_timestamp(&created_at),
        }))
    }

    fn put_report(&self, report: &ReportRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT OR REPLACE INTO reports (session_id, content, email_sent, email_sent_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.session_id.as_str(),
                report.content,
                report.email_sent,
                report.email_sent_at.as_ref().map(timestamp),
                timestamp(&report.created_at),
            ],
        )
        .map_err(internal)?;

        Ok(())
    }

    fn get_report(&self, id: &SessionId) -> StoreResult<Option<ReportRecord>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT content, email_sent, email_sent_at, created_at FROM reports WHERE session_id = ?1",
            params![id.as_str()],
            |row| {
                let email_sent_at: Option<String> = row.get(2)?;
                let created_at: String = row.get(3)?;
                Ok(ReportRecord {
                    session_id: id.clone(),
                    content: row.get(0)?,
                    email_sent: row.get(1)?,
                    email_sent_at: email_sent_at.as_deref().map(parse_timestamp),
                    created_at: parse_timestamp(&created_at),
                })
            },
        )
        .optional()
        .map_err(internal)
    }

    fn mark_report_sent(&self, id: &SessionId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows = conn
            .execute(
                "UPDATE reports SET email_sent = 1, email_sent_at = ?2 WHERE session_id = ?1",
                params![id.as_str(), timestamp(&Utc::now())],
            )
            .map_err(internal)?;

        if rows == 0 {
            return Err(ServerError::NotFound("Report not found"));
        }
        Ok(())
    }

    fn cleanup_expired_sessions(&self, max_age_hours: i64) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let cutoff = timestamp(&(Utc::now() - chrono::Duration::hours(max_age_hours)));

        let rows_deleted = conn
            .execute(
                "DELETE FROM sessions WHERE created_at <= ?1",
                params![cutoff],
            )
            .map_err(internal)?;

        Ok(rows_deleted as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnout_core::Registration;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        (store, dir)
    }

    fn session(id: &str) -> SessionRecord {
        SessionRecord::new(
            SessionId::new(id),
            &Registration::new("Ada Lovelace", "ada@example.com", "+15551234567"),
        )
    }

    #[test]
    fn test_session_flags_persist() {
        let (store, _dir) = create_test_store();
        let mut record = session("s1");
        store.create_session(&record).unwrap();

        record.mark_verified(Channel::Email);
        record.mark_verified(Channel::Secondary);
        store.update_session(&record).unwrap();

        let loaded = store.get_session(&record.id).unwrap().unwrap();
        assert!(loaded.email_verified);
        assert!(loaded.mobile_verified);
        assert_eq!(loaded.step, Progress::Assessment);
        assert_eq!(loaded.mobile, "+15551234567");
    }

    #[test]
    fn test_missing_session_is_none() {
        let (store, _dir) = create_test_store();
        assert!(store.get_session(&SessionId::new("nope")).unwrap().is_none());
    }

    #[test]
    fn test_assessment_labels_round_trip() {
        let (store, _dir) = create_test_store();
        store.create_session(&session("s1")).unwrap();
        let record = AssessmentRecord {
            session_id: SessionId::new("s1"),
            answers: [(1, "Often".to_string()), (7, "Never".to_string())]
                .into_iter()
                .collect(),
            score: 71,
            level: Level::High,
            created_at: Utc::now(),
        };

        store.put_assessment(&record).unwrap();

        let loaded = store.get_assessment(&record.session_id).unwrap().unwrap();
        assert_eq!(loaded.answers, record.answers);
        assert_eq!(loaded.level, Level::High);
        assert_eq!(loaded.score, 71);
    }

    #[test]
    fn test_update_otp_put_keep_remove() {
        let (store, _dir) = create_test_store();
        store.create_session(&session("s1")).unwrap();
        let id = SessionId::new("s1");
        let record = OtpRecord {
            session_id: id.clone(),
            channel: Channel::Secondary,
            code: "123456".to_string(),
            target: "+15551234567".to_string(),
            verified: false,
            attempts: 2,
            resend_count: 1,
            created_at: Utc::now(),
        };

        let seen = store
            .update_otp(&id, Channel::Secondary, |current| {
                (OtpWrite::Put(record.clone()), current.is_some())
            })
            .unwrap();
        assert!(!seen);

        let attempts = store
            .update_otp(&id, Channel::Secondary, |current| {
                (OtpWrite::Keep, current.map(|r| r.attempts))
            })
            .unwrap();
        assert_eq!(attempts, Some(2));
        assert!(store.get_otp(&id, Channel::Email).unwrap().is_none());

        store
            .update_otp(&id, Channel::Secondary, |_| (OtpWrite::Remove, ()))
            .unwrap();
        assert!(store.get_otp(&id, Channel::Secondary).unwrap().is_none());
    }
}
