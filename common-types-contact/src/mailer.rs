use axum::async_trait;
use aws_sdk_sesv2::types::{
    Body,
    Content,
    Destination,
    EmailContent,
    Message,
};
use thiserror::Error;
use common_types::Inquiry::Submission;

use crate::{
    Config::MailConfig,
    Constants,
};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0}")]
    Relay(String),
    #[error("Failed to build email, {0}")]
    Build(String),
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    /// The relay account, used as `From` and copied on every notification.
    fn sender(&self) -> &str;

    async fn send(&self, notification: &Notification) -> Result<(), MailError>;
}

pub struct SesMailRelay {
    client: aws_sdk_sesv2::Client,
    config: MailConfig,
}

impl SesMailRelay {
    pub fn new(client: aws_sdk_sesv2::Client, config: MailConfig) -> Self {
        SesMailRelay { client, config }
    }
}

fn utf8_content(data: &str) -> Result<Content, MailError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|err| MailError::Build(err.to_string()))
}

// Only `Content` can fail to build, `Message` and `Body` hold optional members
fn ses_message(notification: &Notification) -> Result<Message, MailError> {
    Ok(Message::builder()
        .subject(utf8_content(&notification.subject)?)
        .body(
                Body::builder()
                    .html(utf8_content(&notification.html)?)
                    .build()
            )
        .build())
}

#[async_trait]
impl MailRelay for SesMailRelay {
    fn sender(&self) -> &str {
        &self.config.from_address
    }

    #[tracing::instrument(skip(self, notification), fields(to = %notification.to))]
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        let message = ses_message(notification)?;

        self.client
            .send_email()
            .from_email_address(&notification.from)
            .destination(
                    Destination::builder()
                        .to_addresses(&notification.to)
                        .set_cc_addresses(Some(notification.cc.clone()))
                        .build()
                )
            .content(
                    EmailContent::builder()
                        .simple(message)
                        .build()
                )
            .send()
            .await
            .map_err(|err| MailError::Relay(err.into_service_error().to_string()))?;
        Ok(())
    }
}

fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit?usp=sharing")
}

// Escapes user text for an element body. Spaces stay readable and
// newlines become line breaks.
fn escape_text(text: &str) -> String {
    ammonia::clean_text(text)
        .replace("&#32;", " ")
        .replace("&#10;", "<br>")
}

/// Builds the notification the operator receives for one submission.
///
/// User supplied text is escaped, never parsed, so every character the
/// visitor typed shows up in the email. The spreadsheet link only appears
/// when a spreadsheet is configured.
pub fn compose_notification(sender: &str, submission: &Submission, spreadsheet_id: Option<&str>) -> Notification {
    let inquiry = &submission.inquiry;
    let name = escape_text(&inquiry.name);
    let email_text = escape_text(&inquiry.email);
    let email_attr = ammonia::clean_text(&inquiry.email);
    let phone = escape_text(&submission.full_phone);
    let message = escape_text(&inquiry.message);
    let submitted_at = &submission.submitted_at;
    let portfolio_url = Constants::PORTFOLIO_URL;

    let spreadsheet_link = match spreadsheet_id {
        Some(id) => format!(
            r#"<li style="margin: 5px 0;"><a href="{}" style="color: #fbbf24; text-decoration: none; font-weight: bold;">View Collaborations Spreadsheet →</a></li>"#,
            spreadsheet_url(&ammonia::clean_text(id))
        ),
        None => String::new(),
    };

    let html = format!(r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; background: linear-gradient(135deg, #0a0e27 0%, #1a1f3a 100%);">
    <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 12px; padding: 30px;">
      <div style="text-align: center; border-bottom: 3px solid #fbbf24; padding-bottom: 20px; margin-bottom: 20px;">
        <h1 style="color: #fbbf24; margin: 0; font-size: 28px;">🎯 New Project Inquiry</h1>
        <p style="color: #666; margin: 5px 0 0 0;">From Dev-Stack AI Portfolio</p>
      </div>
      <div style="background: #f9f9f9; padding: 20px; border-radius: 8px; margin: 20px 0;">
        <div style="margin-bottom: 15px;">
          <label style="color: #666; font-weight: bold; font-size: 12px; text-transform: uppercase;">Full Name:</label>
          <p style="margin: 5px 0 0 0; font-size: 16px; color: #333;">{name}</p>
        </div>
        <div style="margin-bottom: 15px;">
          <label style="color: #666; font-weight: bold; font-size: 12px; text-transform: uppercase;">Email:</label>
          <p style="margin: 5px 0 0 0; font-size: 16px;"><a href="mailto:{email_attr}" style="color: #fbbf24; text-decoration: none;">{email_text}</a></p>
        </div>
        <div style="margin-bottom: 15px;">
          <label style="color: #666; font-weight: bold; font-size: 12px; text-transform: uppercase;">Phone:</label>
          <p style="margin: 5px 0 0 0; font-size: 16px; color: #333;">{phone}</p>
        </div>
        <div>
          <label style="color: #666; font-weight: bold; font-size: 12px; text-transform: uppercase;">Project Inquiry:</label>
          <p style="margin: 5px 0 0 0; font-size: 14px; color: #555; background: white; padding: 12px; border-left: 4px solid #fbbf24;">{message}</p>
        </div>
      </div>
      <div style="background: #f0f7ff; padding: 15px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #3b82f6;">
        <p style="margin: 0; color: #333; font-size: 13px;"><strong>Submission Date:</strong> {submitted_at}</p>
      </div>
      <div style="background: #fffaf0; padding: 15px; border-radius: 8px; margin: 20px 0; border-left: 4px solid #fbbf24;">
        <p style="margin: 0 0 10px 0;"><strong style="color: #fbbf24;">📊 Tracking & Links</strong></p>
        <ul style="margin: 0; padding-left: 20px; color: #555;">
          {spreadsheet_link}
          <li style="margin: 5px 0;"><a href="{portfolio_url}" style="color: #fbbf24; text-decoration: none; font-weight: bold;">Portfolio Link →</a></li>
        </ul>
      </div>
      <div style="text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee;">
        <p style="color: #999; font-size: 12px; margin: 0;">
          Reply to this inquiry directly: <a href="mailto:{email_attr}" style="color: #fbbf24; text-decoration: none;">{email_text}</a>
          <br><br>
          This is an automated email from Dev-Stack AI Portfolio System.
        </p>
      </div>
    </div>
  </body>
</html>"#);

    Notification {
        from: sender.to_owned(),
        to: Constants::NOTIFICATION_RECIPIENT.to_owned(),
        cc: vec![sender.to_owned()],
        subject: format!("🚀 New Project Inquiry from {} ({})", inquiry.name, submission.full_phone),
        html,
    }
}
