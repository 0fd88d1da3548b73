//! Delivery of account emails.
//!
//! Flows hand their one-time tokens to a `Mailer`. `SmtpMailer` sends real
//! mail over SMTP; `LogMailer` writes the links to the log for local
//! development when no SMTP server is configured.

use crate::config::{Config, EmailConfig};
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;
use std::sync::Arc;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(&self, to: &str, name: &str, token: &str)
    -> ServiceResult<()>;

    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> ServiceResult<()>;
}

pub fn verification_url(base_url: &str, token: &str) -> String {
    format!("{}/api/v1/auth/verify?token={}", base_url, token)
}

pub fn password_reset_url(base_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", base_url, token)
}

/// Picks the SMTP mailer when it is configured and can be built, the logging
/// mailer otherwise.
pub fn mailer_from_config(config: &Config) -> Arc<dyn Mailer> {
    match &config.email {
        Some(email_config) => match SmtpMailer::new(email_config.clone()) {
            Ok(mailer) => {
                tracing::info!("Email service initialized successfully");
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize email service: {}. Links will be logged instead.",
                    e
                );
                Arc::new(LogMailer::new(&config.app_base_url))
            }
        },
        None => {
            tracing::warn!("Email configuration not found. Links will be logged instead.");
            Arc::new(LogMailer::new(&config.app_base_url))
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::validation(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { transport, config })
    }

    /// Sends a multipart plain text and HTML email
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::internal_error(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::validation(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::internal_error(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> ServiceResult<()> {
        let url = verification_url(&self.config.base_url, token);
        let html = build_html(
            "Verify your email",
            name,
            "Thanks for signing up for El Music. Confirm your email address to start listening.",
            "Verify Email",
            &url,
            "This link expires in 24 hours.",
        );
        let text = build_text(
            name,
            "Thanks for signing up for El Music. Confirm your email address:",
            &url,
            "This link expires in 24 hours.",
        );

        self.send_email(to, "Verify your El Music account", &html, &text)
            .await
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> ServiceResult<()> {
        let url = password_reset_url(&self.config.base_url, token);
        let html = build_html(
            "Reset your password",
            name,
            "We received a request to reset the password of your El Music account.",
            "Reset Password",
            &url,
            "This link expires in 1 hour. If you did not ask for a reset, you can ignore this email.",
        );
        let text = build_text(
            name,
            "We received a request to reset the password of your El Music account:",
            &url,
            "This link expires in 1 hour. If you did not ask for a reset, you can ignore this email.",
        );

        self.send_email(to, "Reset your El Music password", &html, &text)
            .await
    }
}

fn build_html(
    title: &str,
    name: &str,
    intro: &str,
    button: &str,
    url: &str,
    footer: &str,
) -> String {
    format!(
        r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>{title}</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2c3e50;">{title}</h2>
                    <p>Hi {name},</p>
                    <p>{intro}</p>
                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{url}"
                           style="background-color: #1db954; color: white; padding: 12px 30px;
                                  text-decoration: none; border-radius: 5px; display: inline-block;">
                            {button}
                        </a>
                    </div>
                    <p>Or copy and paste this link into your browser:</p>
                    <p style="word-break: break-all; color: #7f8c8d;">{url}</p>
                    <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">
                    <p style="font-size: 12px; color: #7f8c8d;">{footer}</p>
                </div>
            </body>
            </html>
            "#
    )
}

fn build_text(name: &str, intro: &str, url: &str, footer: &str) -> String {
    format!("Hi {name},\n\n{intro}\n{url}\n\n{footer}\n")
}

/// Development mailer that logs the links instead of sending them.
pub struct LogMailer {
    base_url: String,
}

impl LogMailer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        _name: &str,
        token: &str,
    ) -> ServiceResult<()> {
        tracing::info!(
            "Verification link for {}: {}",
            to,
            verification_url(&self.base_url, token)
        );
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        _name: &str,
        token: &str,
    ) -> ServiceResult<()> {
        tracing::info!(
            "Password reset link for {}: {}",
            to,
            password_reset_url(&self.base_url, token)
        );
        Ok(())
    }
}

#[cfg(test)]
pub use recording::{RecordingMailer, SentEmail};

#[cfg(test)]
mod recording {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentEmail {
        Verification { to: String, token: String },
        PasswordReset { to: String, token: String },
    }

    /// Mailer that keeps every message in memory.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<SentEmail>>,
        stalled: bool,
    }

    impl RecordingMailer {
        /// A mailer whose reset deliveries never complete.
        pub fn stalled() -> Self {
            Self {
                stalled: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<SentEmail> {
            self.sent.lock().unwrap().clone()
        }

        /// Token of the most recent verification email to `to`.
        pub fn verification_token(&self, to: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|email| match email {
                SentEmail::Verification { to: addr, token } if addr == to => Some(token),
                _ => None,
            })
        }

        /// Token of the most recent reset email to `to`.
        pub fn reset_token(&self, to: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|email| match email {
                SentEmail::PasswordReset { to: addr, token } if addr == to => Some(token),
                _ => None,
            })
        }

        /// Waits for a reset email delivered from a background task.
        pub async fn delivered_reset_token(&self, to: &str) -> Option<String> {
            for _ in 0..100 {
                if let Some(token) = self.reset_token(to) {
                    return Some(token);
                }
                tokio::task::yield_now().await;
            }
            None
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_verification_email(
            &self,
            to: &str,
            _name: &str,
            token: &str,
        ) -> ServiceResult<()> {
            self.sent.lock().unwrap().push(SentEmail::Verification {
                to: to.to_string(),
                token: token.to_string(),
            });
            Ok(())
        }

        async fn send_password_reset_email(
            &self,
            to: &str,
            _name: &str,
            token: &str,
        ) -> ServiceResult<()> {
            if self.stalled {
                std::future::pending::<()>().await;
            }
            self.sent.lock().unwrap().push(SentEmail::PasswordReset {
                to: to.to_string(),
                token: token.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_point_at_the_right_endpoints() {
        assert_eq!(
            verification_url("http://localhost:8080", "abc"),
            "http://localhost:8080/api/v1/auth/verify?token=abc"
        );
        assert_eq!(
            password_reset_url("https://elmusic.app", "xyz"),
            "https://elmusic.app/reset-password?token=xyz"
        );
    }

    #[test]
    fn test_text_body_contains_link() {
        let body = build_text("Ana", "Confirm:", "http://x/verify?token=t", "Bye");
        assert!(body.starts_with("Hi Ana,"));
        assert!(body.contains("http://x/verify?token=t"));
    }

    #[tokio::test]
    async fn test_log_mailer_never_fails() {
        let mailer = LogMailer::new("http://localhost:8080/");
        mailer
            .send_verification_email("ana@x.com", "Ana", "token")
            .await
            .unwrap();
        mailer
            .send_password_reset_email("ana@x.com", "Ana", "token")
            .await
            .unwrap();
    }
}
