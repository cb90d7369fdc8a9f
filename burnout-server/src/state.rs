//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::email::EmailSender;
use crate::otp::OtpPolicy;
use crate::report::ReportGenerator;
use crate::sms::SmsSender;
use crate::store::Store;

/// State shared by every handler
pub struct AppState<S, E> {
    pub config: Config,
    pub store: S,
    pub email_sender: E,
    pub sms_sender: Box<dyn SmsSender>,
    /// Shared so generation can move to a blocking task
    pub report_generator: Arc<dyn ReportGenerator>,
}

impl<S, E> AppState<S, E>
where
    S: Store,
    E: EmailSender,
{
    pub fn new(
        config: Config,
        store: S,
        email_sender: E,
        sms_sender: Box<dyn SmsSender>,
        report_generator: Arc<dyn ReportGenerator>,
    ) -> Self {
        Self {
            config,
            store,
            email_sender,
            sms_sender,
            report_generator,
        }
    }

    pub fn otp_policy(&self) -> OtpPolicy {
        OtpPolicy {
            expiry_minutes: self.config.otp_expiry_minutes,
            max_resend_attempts: self.config.otp_max_resend_attempts,
        }
    }
}
