use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};

use super::{ConsoleChannel, Delivery, Mailer, NotifyError};

/// SMTP settings. Persisted under `email` in settings.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSettings {
    /// Print mails instead of sending them
    #[serde(default = "default_test_mode")]
    pub test_mode: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub sender_password: String,
}

fn default_test_mode() -> bool {
    true
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            test_mode: true,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
        }
    }
}

impl EmailSettings {
    /// SMTP is only attempted outside test mode with full credentials.
    pub fn uses_smtp(&self) -> bool {
        !self.test_mode && !self.sender_email.is_empty() && !self.sender_password.is_empty()
    }
}

pub struct EmailNotifier {
    settings: EmailSettings,
    console: Arc<ConsoleChannel>,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings, console: Arc<ConsoleChannel>) -> Self {
        Self { settings, console }
    }

    fn send_smtp(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let from: Mailbox = self
            .settings
            .sender_email
            .parse()
            .map_err(|_| NotifyError::Address(self.settings.sender_email.clone()))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| NotifyError::Address(recipient.to_string()))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(render_html(body))?;

        let transport = SmtpTransport::starttls_relay(&self.settings.smtp_server)?
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                self.settings.sender_email.clone(),
                self.settings.sender_password.clone(),
            ))
            .build();
        transport.send(&email)?;
        Ok(())
    }
}

impl Mailer for EmailNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<Delivery, NotifyError> {
        if !self.settings.uses_smtp() {
            if let Err(e) = self.console.show_mail(recipient, subject, body) {
                log::warn!("Failed to print test mail: {}", e);
            }
            return Ok(Delivery::Console);
        }

        match self.send_smtp(recipient, subject, body) {
            Ok(()) => {
                log::info!("Email sent successfully to {}", recipient);
                Ok(Delivery::Smtp)
            }
            Err(e) => {
                log::error!("Failed to send email: {}", e);
                if let Err(write_err) = self
                    .console
                    .show_line(&format!("FALLBACK ALERT for {recipient}: {subject}"))
                {
                    log::warn!("Failed to write fallback alert: {}", write_err);
                }
                Err(e)
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap a plain-text alert in the StellarWatch mail layout.
pub fn render_html(message: &str) -> String {
    let body = escape_html(message).replace('\n', "<br>");
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; background: #0c0c2e; color: white; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background: rgba(255,255,255,0.1); padding: 30px; border-radius: 15px;">
      <h1 style="text-align: center;">StellarWatch Alert</h1>
      <div style="background: rgba(255,255,255,0.1); padding: 20px; border-radius: 10px; margin: 20px 0;">
        {body}
      </div>
      <p style="text-align: center; color: #a0a0c0; font-size: 12px;">
        Sent from StellarWatch Astronomical Monitoring System
      </p>
    </div>
  </body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notify::console::tests::Captured;

    fn notifier(settings: EmailSettings) -> (EmailNotifier, Captured) {
        let captured = Captured::default();
        let console = Arc::new(ConsoleChannel::new(Box::new(captured.clone())));
        (EmailNotifier::new(settings, console), captured)
    }

    #[test]
    fn test_test_mode_prints_to_console() {
        let (mailer, captured) = notifier(EmailSettings::default());
        let delivery = mailer
            .send("user@example.com", "Alert: ISS", "Look up!")
            .unwrap();

        assert_eq!(delivery, Delivery::Console);
        let text = captured.text();
        assert!(text.contains("Subject: Alert: ISS"));
        assert!(text.contains("Message: Look up!"));
    }

    #[test]
    fn test_missing_credentials_fall_back_to_console() {
        let settings = EmailSettings {
            test_mode: false,
            sender_email: "sender@example.com".to_string(),
            ..EmailSettings::default()
        };
        assert!(!settings.uses_smtp());
        let (mailer, _) = notifier(settings);
        assert_eq!(
            mailer.send("user@example.com", "s", "b").unwrap(),
            Delivery::Console
        );
    }

    #[test]
    fn test_bad_sender_address_is_rejected_before_connecting() {
        let settings = EmailSettings {
            test_mode: false,
            sender_email: "not an address".to_string(),
            sender_password: "secret".to_string(),
            ..EmailSettings::default()
        };
        let (mailer, captured) = notifier(settings);
        let err = mailer.send("user@example.com", "Alert: X", "b").unwrap_err();

        assert!(matches!(err, NotifyError::Address(_)));
        assert!(captured.text().contains("FALLBACK ALERT for user@example.com: Alert: X"));
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_failure_keeps_smtp_error() {
        let settings = EmailSettings {
            test_mode: false,
            sender_email: "not an address".to_string(),
            sender_password: "secret".to_string(),
            ..EmailSettings::default()
        };
        let console = Arc::new(ConsoleChannel::new(Box::new(BrokenPipe)));
        let mailer = EmailNotifier::new(settings, console);

        let err = mailer.send("user@example.com", "Alert: X", "b").unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }

    #[test]
    fn test_render_html_escapes_and_breaks_lines() {
        let html = render_html("a < b\nc & d");
        assert!(html.contains("a &lt; b<br>c &amp; d"));
    }
}
