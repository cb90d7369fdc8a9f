//! Code and report delivery through an SMTP relay

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

use super::{code_message, report_message, EmailSender};

const DEFAULT_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "Burnout Score Checker";

/// How the connection to the relay is secured, chosen from the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Port 465
    ImplicitTls,
    /// Port 587
    StartTls,
    /// Any other port, for local mail catchers
    Plain,
}

impl SmtpSecurity {
    fn for_port(port: u16) -> Self {
        match port {
            465 => SmtpSecurity::ImplicitTls,
            587 => SmtpSecurity::StartTls,
            _ => SmtpSecurity::Plain,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    /// Username and password; relays that accept anonymous senders need none
    pub credentials: Option<(String, String)>,
    /// Sender of both the code and the report emails
    pub from: Mailbox,
}

impl SmtpConfig {
    /// Read SMTP_HOST, SMTP_PORT, SMTP_USERNAME, SMTP_PASSWORD,
    /// SMTP_FROM_EMAIL and SMTP_FROM_NAME. `None` when no relay is configured
    /// or the sender address does not parse.
    pub fn from_env() -> Option<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());

        let host = get("SMTP_HOST")?;
        let port = get("SMTP_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let address: Address = match get("SMTP_FROM_EMAIL")?.parse() {
            Ok(address) => address,
            Err(e) => {
                tracing::error!(error = %e, "SMTP_FROM_EMAIL is not a valid address");
                return None;
            }
        };
        let name = get("SMTP_FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string());

        Some(Self {
            host,
            port,
            security: SmtpSecurity::for_port(port),
            credentials: get("SMTP_USERNAME").zip(get("SMTP_PASSWORD")),
            from: Mailbox::new(Some(name), address),
        })
    }
}

/// Sends verification codes and finished reports as plain-text mail
pub struct SmtpEmailSender {
    transport: SmtpTransport,
    from: Mailbox,
    code_expiry_minutes: i64,
}

impl SmtpEmailSender {
    /// Connect to the relay. Fails when it cannot be reached so a broken
    /// setup shows up at startup rather than on the first registration.
    pub fn new(config: SmtpConfig, code_expiry_minutes: i64) -> Result<Self, String> {
        let builder = match config.security {
            SmtpSecurity::ImplicitTls => SmtpTransport::relay(&config.host),
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&config.host),
            SmtpSecurity::Plain => Ok(SmtpTransport::builder_dangerous(&config.host)),
        }
        .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        .port(config.port);

        let transport = match config.credentials {
            Some((username, password)) => builder
                .credentials(Credentials::new(username, password))
                .build(),
            None => builder.build(),
        };

        transport
            .test_connection()
            .map_err(|e| format!("SMTP relay {} unreachable: {}", config.host, e))?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            security = ?config.security,
            from = %config.from,
            "SMTP relay ready"
        );

        Ok(Self {
            transport,
            from: config.from,
            code_expiry_minutes,
        })
    }

    fn deliver(&self, to: &str, name: &str, subject: &str, body: String) -> Result<(), String> {
        let message = build_message(&self.from, to, name, subject, body)?;
        self.transport
            .send(&message)
            .map_err(|e| format!("Failed to send email: {}", e))?;
        Ok(())
    }
}

/// Plain-text message addressed to the visitor by name
fn build_message(
    from: &Mailbox,
    to: &str,
    name: &str,
    subject: &str,
    body: String,
) -> Result<Message, String> {
    let address: Address = to
        .parse()
        .map_err(|e| format!("Invalid recipient address {}: {}", to, e))?;

    Message::builder()
        .from(from.clone())
        .to(Mailbox::new(Some(name.to_string()), address))
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| format!("Failed to build email: {}", e))
}

impl EmailSender for SmtpEmailSender {
    fn send_code(&self, email: &str, name: &str, code: &str) -> Result<(), String> {
        let (subject, body) = code_message(name, code, self.code_expiry_minutes);
        self.deliver(email, name, subject, body)?;
        tracing::info!(email = %email, "Verification code emailed");
        Ok(())
    }

    fn send_report(&self, email: &str, name: &str, report: &str) -> Result<(), String> {
        let (subject, body) = report_message(name, report);
        self.deliver(email, name, subject, body)?;
        tracing::info!(email = %email, length = report.len(), "Report emailed");
        Ok(())
    }
}
