//! Resumption markers carried by the payment return URL

use burnout_core::SessionId;
use url::Url;

/// Query parameter carrying the payment outcome
pub const PAYMENT_PARAM: &str = "payment";
/// Value of [`PAYMENT_PARAM`] on a successful return
pub const PAYMENT_SUCCESS: &str = "success";
/// Query parameter carrying the session identifier
pub const SESSION_PARAM: &str = "session_id";

/// Proof that the page was loaded by a return from the payment page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeMarkers {
    pub session_id: SessionId,
}

impl ResumeMarkers {
    /// Extract markers from a page URL. Both the success indicator and a
    /// non-empty session identifier must be present.
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut success = false;
        let mut session_id = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                PAYMENT_PARAM => success = value == PAYMENT_SUCCESS,
                SESSION_PARAM if !value.is_empty() => session_id = Some(value.into_owned()),
                _ => {}
            }
        }

        match (success, session_id) {
            (true, Some(id)) => Some(Self {
                session_id: SessionId(id),
            }),
            _ => None,
        }
    }
}
