//! User-facing message output.
//!
//! The session decides what to say; the view decides how and for how long
//! to show it.

/// Receives human-readable messages from the session.
pub trait ErrorSink {
    /// Deliver one message.
    fn report(&mut self, message: &str);
}

impl<F> ErrorSink for F
where
    F: FnMut(&str),
{
    fn report(&mut self, message: &str) {
        self(message)
    }
}

/// Sink that keeps every message in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    messages: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Most recent message, i.e. what the banner currently shows.
    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl ErrorSink for RecordingSink {
    fn report(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.report("first");
        sink.report("second");

        assert_eq!(sink.messages(), ["first".to_string(), "second".to_string()]);
        assert_eq!(sink.last(), Some("second"));

        sink.clear();
        assert!(sink.last().is_none());
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |message: &str| seen.push(message.len());
            sink.report("four");
        }
        assert_eq!(seen, vec![4]);
    }
}
