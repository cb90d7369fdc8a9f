//! Console-based email sender for development

use super::EmailSender;

/// Email sender that logs to console (for development)
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEmailSender {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailSender for ConsoleEmailSender {
    fn send_code(&self, email: &str, name: &str, code: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  VERIFICATION CODE FOR: {} <{}>", name, email);
        println!("  CODE: {}", code);
        println!("========================================");
        println!();

        tracing::info!(email = %email, code = %code, "Verification code sent");

        Ok(())
    }

    fn send_report(&self, email: &str, name: &str, report: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  REPORT FOR: {} <{}>", name, email);
        println!("========================================");
        println!("{}", report);
        println!("========================================");
        println!();

        tracing::info!(email = %email, length = report.len(), "Report sent");

        Ok(())
    }
}
