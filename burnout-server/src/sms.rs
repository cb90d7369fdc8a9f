//! SMS delivery of mobile verification codes
//!
//! No SMS provider is wired in. [`ConsoleSmsSender`] logs the code so the
//! mobile step can be completed during development.

/// Trait for sending codes by SMS
pub trait SmsSender: Send + Sync {
    fn send_code(&self, number: &str, code: &str) -> Result<(), String>;
}

/// SMS sender that logs instead of sending
pub struct ConsoleSmsSender;

impl ConsoleSmsSender {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSmsSender {
    fn default() -> Self {
        Self::new()
    }
}

impl SmsSender for ConsoleSmsSender {
    fn send_code(&self, number: &str, code: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  SMS CODE FOR: {}", number);
        println!("  CODE: {}", code);
        println!("========================================");
        println!();

        tracing::warn!(number = %number, code = %code, "SMS provider not configured, code logged only");

        Ok(())
    }
}
