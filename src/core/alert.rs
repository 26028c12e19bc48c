//! Price threshold alert with email notification

use crate::core::config::AlertConfig;
use crate::core::error::TrackerError;
use crate::core::history::{HistoryFrame, HistoryProvider, Period};
use crate::core::symbol::Symbol;
use async_trait::async_trait;
use lettre::message::{Message, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier configuration error: {0}")]
    Config(String),

    #[error("Notifier network error: {0}")]
    Network(String),

    #[error("Failed to build notification: {0}")]
    Build(String),
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error(transparent)]
    Price(#[from] TrackerError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Delivers a short message to someone.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError>;
}

/// Sends notifications through an SMTP relay, upgrading the plain
/// connection with STARTTLS before authenticating.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
}

impl EmailNotifier {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
        from: &str,
        to: &str,
    ) -> Result<Self, NotifyError> {
        let creds = Credentials::new(user.to_string(), pass.to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| NotifyError::Config(format!("Invalid SMTP host: {e}")))?
            .port(port)
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Builds a notifier for `to` from the alert section of the config. The
    /// password is read from the environment variable it names.
    pub fn from_config(config: &AlertConfig, to: &str) -> Result<Self, NotifyError> {
        let user = config
            .username
            .as_deref()
            .ok_or_else(|| NotifyError::Config("alert.username is not set".to_string()))?;
        let pass = std::env::var(&config.password_env).map_err(|_| {
            NotifyError::Config(format!(
                "Environment variable {} is not set",
                config.password_env
            ))
        })?;
        let from = config.from.as_deref().unwrap_or(user);
        Self::new(&config.smtp_host, config.smtp_port, user, &pass, from, to)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotifyError::Config(format!("Invalid from address: {e}")))?,
            )
            .to(self
                .to
                .parse()
                .map_err(|e| NotifyError::Config(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| NotifyError::Build(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Network(format!("SMTP error: {e}")))?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertOutcome {
    pub symbol: Symbol,
    pub current: f64,
    pub target: f64,
    pub triggered: bool,
}

/// Looks up the latest USD close for `symbol` and notifies when it is at or
/// above `target`.
#[instrument(name = "PriceAlert", skip(provider, notifier))]
pub async fn check_alert(
    provider: &dyn HistoryProvider,
    symbol: &str,
    target: f64,
    notifier: &dyn Notifier,
) -> Result<AlertOutcome, AlertError> {
    let symbol = Symbol::parse(symbol)?;
    let bars = provider.history(&symbol, Period::OneDay).await?;
    let frame =
        HistoryFrame::from_bars(bars).ok_or_else(|| TrackerError::NoData(symbol.to_string()))?;
    let current = frame.last_close();

    let triggered = current >= target;
    if triggered {
        let subject = format!("Price alert: {symbol}");
        let content = format!(
            "{symbol} is trading at ${current:.2}, at or above your target of ${target:.2}."
        );
        notifier.notify(&subject, &content).await?;
        info!("Alert sent for {} at {:.2}", symbol, current);
    } else {
        info!(
            "{} at {:.2} is below target {:.2}; no alert",
            symbol, current, target
        );
    }

    Ok(AlertOutcome {
        symbol,
        current,
        target,
        triggered,
    })
}
