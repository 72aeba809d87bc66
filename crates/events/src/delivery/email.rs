//! Welcome email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport and implements
//! [`WelcomeMailer`]. Configuration is loaded from environment variables; if
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and the
//! host should fall back to [`DisabledMailer`].

use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use storefront_core::notify::{NotifyError, WelcomeMailer};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@storefront.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                     |
    /// |-----------------|----------|-----------------------------|
    /// | `SMTP_HOST`     | yes      | --                           |
    /// | `SMTP_PORT`     | no       | `587`                       |
    /// | `SMTP_FROM`     | no       | `noreply@storefront.local`  |
    /// | `SMTP_USER`     | no       | --                           |
    /// | `SMTP_PASSWORD` | no       | --                           |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Welcome template
// ---------------------------------------------------------------------------

/// Rendered welcome email content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Render the fixed welcome template for `address`.
pub fn welcome_message(address: &str) -> WelcomeMessage {
    WelcomeMessage {
        subject: "Welcome to our store!".to_string(),
        html: format!(
            "<html>\n  <body>\n    <h1>Welcome to our store!</h1>\n    \
             <p>Thanks for signing up, {address}. We're happy to have you here.</p>\n  \
             </body>\n</html>\n"
        ),
        text: format!(
            "Welcome to our store! Thanks for signing up, {address}. We're happy to have you here."
        ),
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends welcome emails via SMTP.
pub struct EmailDelivery {
    from_address: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the SMTP transport for the given configuration.
    ///
    /// No connection is opened until the first email is sent.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            transport_builder = transport_builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            from_address: config.from_address,
            mailer: transport_builder.build(),
        })
    }

    /// Send the welcome email to `to_email`.
    pub async fn deliver_welcome(&self, to_email: &str) -> Result<(), EmailError> {
        let content = welcome_message(to_email);

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(content.subject)
            .multipart(MultiPart::alternative_plain_html(content.text, content.html))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let response = self.mailer.send(email).await?;

        tracing::info!(
            to = to_email,
            code = %response.code(),
            "Welcome email sent"
        );
        Ok(())
    }
}

#[async_trait]
impl WelcomeMailer for EmailDelivery {
    async fn send_welcome_email(&self, address: &str) -> Result<(), NotifyError> {
        self.deliver_welcome(address)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// DisabledMailer
// ---------------------------------------------------------------------------

/// Stand-in used when SMTP is not configured.
///
/// Every send fails so the handler logs the skipped address.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl WelcomeMailer for DisabledMailer {
    async fn send_welcome_email(&self, _address: &str) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured("email"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
