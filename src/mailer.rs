use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;

/// Outbound email message.
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email-sending capability, injected once at startup.
///
/// Delivery is best-effort everywhere: callers log failures and carry on,
/// a lost email never fails the primary operation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// Sends through an HTTP email API (JSON POST, bearer-key auth).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&OutboundMessage {
                from: &self.from_address,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await
            .context("mail api request")?;

        if !response.status().is_success() {
            anyhow::bail!("mail api returned {}", response.status());
        }
        Ok(())
    }
}

/// Stand-in used when mail is not configured; logs and drops the message.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        tracing::warn!(to = %email.to, subject = %email.subject, "mailer disabled, dropping email");
        Ok(())
    }
}

pub fn verification_email(username: &str, verification_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Welcome to Voicedo!</h2>
  <p>Hi {username},</p>
  <p>Thanks for signing up. Please verify your email address by clicking the button:</p>
  <a href="{verification_url}" style="display: inline-block; padding: 12px 24px; background-color: #00B894; color: white; text-decoration: none; border-radius: 6px;">Verify email</a>
  <p>Or copy this link into your browser:</p>
  <p style="word-break: break-all;">{verification_url}</p>
  <p>If you did not create this account, ignore this email.</p>
</div>"#
    )
}

pub fn reset_password_email(username: &str, reset_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Password recovery</h2>
  <p>Hi {username},</p>
  <p>We received a request to reset your password. Click the button to choose a new one:</p>
  <a href="{reset_url}" style="display: inline-block; padding: 12px 24px; background-color: #2193B0; color: white; text-decoration: none; border-radius: 6px;">Reset password</a>
  <p>This link expires in one hour. If you did not request it, ignore this email.</p>
  <p style="word-break: break-all;">{reset_url}</p>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_mailer_swallows_messages() {
        let mailer = NoopMailer;
        let result = mailer
            .send(Email {
                to: "alice@example.com".into(),
                subject: "hello".into(),
                html: "<p>hi</p>".into(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn templates_embed_username_and_url() {
        let html = verification_email("alice", "https://app.local/verify-email/abc");
        assert!(html.contains("alice"));
        assert!(html.contains("https://app.local/verify-email/abc"));

        let html = reset_password_email("bob", "https://app.local/reset-password/def");
        assert!(html.contains("bob"));
        assert!(html.contains("https://app.local/reset-password/def"));
    }
}
