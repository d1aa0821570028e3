//! Outbound email.
//!
//! Services hand an [`EmailMessage`] to an [`EmailSender`]. In production that
//! is [`SmtpEmailSender`]; with `SMTP_ENABLED=false` it is [`LogEmailSender`],
//! which only logs the message.

use std::sync::Arc;

use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{Instrument, info, info_span};

use schoolhub_config::EmailConfig;
use schoolhub_core::{AppError, BoxFuture};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Email delivery abstraction.
pub trait EmailSender: Send + Sync {
    /// Deliver a message. Failures surface as delivery errors.
    fn send<'a>(&'a self, message: &'a EmailMessage) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Picks the sender matching the configuration.
pub fn email_sender_from_config(config: &EmailConfig) -> Arc<dyn EmailSender> {
    if config.enabled {
        Arc::new(SmtpEmailSender::new(config.clone()))
    } else {
        Arc::new(LogEmailSender)
    }
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            info!(
                to_email = %message.to_email,
                subject = %message.subject,
                body = %message.text_body,
                "Email delivery disabled, logging message"
            );
            Ok(())
        })
    }
}

pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, AppError> {
        Message::builder()
            .from(
                self.config
                    .sender()
                    .parse()
                    .map_err(|e| AppError::delivery(anyhow::anyhow!("Invalid from email: {}", e)))?,
            )
            .to(message
                .to_email
                .parse()
                .map_err(|e| AppError::delivery(anyhow::anyhow!("Invalid to email: {}", e)))?)
            .subject(message.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(message.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(message.html_body.clone()),
                    ),
            )
            .map_err(|e| AppError::delivery(anyhow::anyhow!("Failed to build email: {}", e)))
    }

    fn build_transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .timeout(Some(self.config.timeout))
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::delivery(anyhow::anyhow!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .timeout(Some(self.config.timeout))
            .build())
    }
}

impl EmailSender for SmtpEmailSender {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> BoxFuture<'a, Result<(), AppError>> {
        let span = info_span!("smtp_send", to_email = %message.to_email);

        Box::pin(
            async move {
                let email = self.build_message(message)?;
                let mailer = self.build_transport()?;

                tokio::task::spawn_blocking(move || mailer.send(&email))
                    .await
                    .map_err(|e| AppError::delivery(anyhow::anyhow!("Task join error: {}", e)))?
                    .map_err(|e| {
                        AppError::delivery(anyhow::anyhow!("Failed to send email: {}", e))
                    })?;

                Ok(())
            }
            .instrument(span),
        )
    }
}

/// Verification email carrying a one-time code.
pub fn otp_email(to_email: &str, to_name: &str, otp: &str, expiry_minutes: i64) -> EmailMessage {
    let text_body = format!(
        "Hi {},\n\n\
         Your SchoolHub verification code is: {}\n\n\
         The code expires in {} minutes.\n\n\
         If you didn't create an account, please ignore this email.\n\n\
         Best regards,\n\
         SchoolHub Team",
        to_name, otp, expiry_minutes
    );

    EmailMessage {
        to_email: to_email.to_string(),
        to_name: to_name.to_string(),
        subject: "Your SchoolHub verification code".to_string(),
        text_body,
        html_body: otp_template(&escape_html(to_name), otp, expiry_minutes),
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn otp_template(name: &str, otp: &str, expiry_minutes: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Verify your email</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 4px rgba(0,0,0,0.1);">
                    <tr>
                        <td style="background-color: #4F46E5; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">SchoolHub</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                Hi <strong>{}</strong>,
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                Use the code below to verify your email address:
                            </p>
                            <p style="margin: 30px 0; text-align: center; color: #333333; font-size: 32px; font-weight: bold; letter-spacing: 8px;">
                                {}
                            </p>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 14px; line-height: 1.5;">
                                <strong>This code expires in {} minutes.</strong>
                            </p>
                            <p style="margin: 0; color: #666666; font-size: 14px; line-height: 1.5;">
                                If you didn't create an account, please ignore this email.
                            </p>
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from SchoolHub. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        name, otp, expiry_minutes
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_email_states_expiry_window() {
        let message = otp_email("ann@example.com", "Ann", "482913", 10);

        assert_eq!(message.to_email, "ann@example.com");
        assert!(message.text_body.contains("482913"));
        assert!(message.text_body.contains("expires in 10 minutes"));
        assert!(message.html_body.contains("expires in 10 minutes"));
    }

    #[test]
    fn test_otp_email_escapes_name_in_html() {
        let message = otp_email("ann@example.com", "<b>Ann</b>", "482913", 10);

        assert!(message.html_body.contains("&lt;b&gt;Ann&lt;/b&gt;"));
        assert!(!message.html_body.contains("<b>Ann</b>"));
    }

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let message = otp_email("ann@example.com", "Ann", "482913", 10);
        assert!(LogEmailSender.send(&message).await.is_ok());
    }
}
