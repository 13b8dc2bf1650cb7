use std::io::{self, Write};
use std::sync::Mutex;

use crate::core::alerts::model::Alert;

const RULE_WIDTH: usize = 60;

/// Writes alert banners to a terminal (or any writer).
pub struct ConsoleChannel {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ConsoleChannel {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn show_alert(&self, alert: &Alert) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        self.write_block(&format!(
            "\n{rule}\nASTRONOMICAL ALERT! ({})\n{rule}\n{}\n{rule}\n",
            alert.location, alert.message
        ))
    }

    /// Console rendering of an email, used when SMTP is not in play.
    pub fn show_mail(&self, recipient: &str, subject: &str, body: &str) -> io::Result<()> {
        self.write_block(&format!(
            "EMAIL ALERT (Test Mode)\n   To: {recipient}\n   Subject: {subject}\n   Message: {body}\n{}\n",
            "-".repeat(50)
        ))
    }

    pub fn show_line(&self, line: &str) -> io::Result<()> {
        self.write_block(&format!("{line}\n"))
    }

    fn write_block(&self, text: &str) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "console writer poisoned"))?;
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Shared in-memory writer so tests can read back what was printed.
    #[derive(Clone, Default)]
    pub(crate) struct Captured(pub Arc<Mutex<Vec<u8>>>);

    impl Captured {
        pub(crate) fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_banner() {
        let captured = Captured::default();
        let console = ConsoleChannel::new(Box::new(captured.clone()));
        let alert = Alert {
            key: "k".to_string(),
            location: "london".to_string(),
            event_name: "Test".to_string(),
            category: crate::core::model::EventCategory::Other,
            subject: "Alert: Test".to_string(),
            message: "Test is happening soon!".to_string(),
            created_at: chrono::Utc::now(),
        };

        console.show_alert(&alert).unwrap();
        let text = captured.text();
        assert!(text.contains("ASTRONOMICAL ALERT! (london)"));
        assert!(text.contains("Test is happening soon!"));
        assert_eq!(text.matches(&"=".repeat(RULE_WIDTH)).count(), 3);
    }

    #[test]
    fn test_console_mail() {
        let captured = Captured::default();
        let console = ConsoleChannel::new(Box::new(captured.clone()));
        console
            .show_mail("user@example.com", "Alert: Test", "body")
            .unwrap();
        assert!(captured.text().contains("   To: user@example.com"));
    }
}
