use chrono::{DateTime, Local};

/// One piece of fetched text. Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub fetched_at: DateTime<Local>,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self::at(text, Local::now())
    }

    pub fn at(text: impl Into<String>, fetched_at: DateTime<Local>) -> Self {
        Self { text: text.into(), fetched_at }
    }

    /// RFC 1123 style, e.g. `Mon, 02 Jan 2006 15:04:05 +01:00`.
    pub fn timestamp(&self) -> String {
        self.fetched_at.format("%a, %d %b %Y %H:%M:%S %Z").to_string()
    }
}
