//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use burnout_core::{Channel, SessionId};

use super::{
    AssessmentRecord, OtpRecord, OtpWrite, ReportRecord, SessionRecord, Store, StoreResult,
};
use crate::error::ServerError;

/// In-memory store, lost on restart
pub struct InMemoryStore {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
    otps: RwLock<HashMap<(SessionId, Channel), OtpRecord>>,
    assessments: RwLock<HashMap<SessionId, AssessmentRecord>>,
    reports: RwLock<HashMap<SessionId, ReportRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            otps: RwLock::new(HashMap::new()),
            assessments: RwLock::new(HashMap::new()),
            reports: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    fn create_session(&self, session: &SessionRecord) -> StoreResult<()> {
        let mut sessions = self.sessions.write().unwrap();
        if sessions.contains_key(&session.id) {
            return Err(ServerError::Internal(format!(
                "Duplicate session id {}",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>> {
        Ok(self.sessions.read().unwrap().get(id).cloned())
    }

    fn update_session(&self, session: &SessionRecord) -> StoreResult<()> {
        let mut sessions = self.sessions.write().unwrap();
        match sessions.get_mut(&session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(ServerError::SessionNotFound),
        }
    }

    fn update_otp<T, F>(&self, id: &SessionId, channel: Channel, update: F) -> StoreResult<T>
    where
        F: FnOnce(Option<&OtpRecord>) -> (OtpWrite, T),
    {
        let mut otps = self.otps.write().unwrap();
        let key = (id.clone(), channel);

        let (write, result) = update(otps.get(&key));
        match write {
            OtpWrite::Keep => {}
            OtpWrite::Put(record) => {
                otps.insert(key, record);
            }
            OtpWrite::Remove => {
                otps.remove(&key);
            }
        }

        Ok(result)
    }

    fn get_otp(&self, id: &SessionId, channel: Channel) -> StoreResult<Option<OtpRecord>> {
        Ok(self
            .otps
            .read()
            .unwrap()
            .get(&(id.clone(), channel))
            .cloned())
    }

    fn put_assessment(&self, assessment: &AssessmentRecord) -> StoreResult<()> {
        self.assessments
            .write()
            .unwrap()
            .insert(assessment.session_id.clone(), assessment.clone());
        Ok(())
    }

    fn get_assessment(&self, id: &SessionId) -> StoreResult<Option<AssessmentRecord>> {
        Ok(self.assessments.read().unwrap().get(id).cloned())
    }

    fn put_report(&self, report: &ReportRecord) -> StoreResult<()> {
        self.reports
            .write()
            .unwrap()
            .insert(report.session_id.clone(), report.clone());
        Ok(())
    }

    fn get_report(&self, id: &SessionId) -> StoreResult<Option<ReportRecord>> {
        Ok(self.reports.read().unwrap().get(id).cloned())
    }

    fn mark_report_sent(&self, id: &SessionId) -> StoreResult<()> {
        let mut reports = self.reports.write().unwrap();
        match reports.get_mut(id) {
            Some(report) => {
                report.email_sent = true;
                report.email_sent_at = Some(Utc::now());
                Ok(())
            }
            None => Err(ServerError::NotFound("Report not found")),
        }
    }

    fn cleanup_expired_sessions(&self, max_age_hours: i64) -> StoreResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours);
        let mut sessions = self.sessions.write().unwrap();
        let expired: Vec<SessionId> = sessions
            .values()
            .filter(|s| s.created_at <= cutoff)
            .map(|s| s.id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
        }

        self.otps
            .write()
            .unwrap()
            .retain(|(id, _), _| !expired.contains(id));
        self.assessments
            .write()
            .unwrap()
            .retain(|id, _| !expired.contains(id));
        self.reports
            .write()
            .unwrap()
            .retain(|id, _| !expired.contains(id));

        Ok(expired.len() as u64)
    }
}
