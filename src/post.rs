use chrono::{DateTime, Local};

use crate::error::BlogError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub theme: String,
    pub category: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub description: String,
    pub generated_at: DateTime<Local>,
    /// Set when any prose in the post came from canned fallback text.
    pub degraded: bool,
}

/// A finished blog post. The lead, content sections and footer are rendered
/// in that order, separated by blank lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub lead: String,
    pub sections: Vec<String>,
    pub footer: String,
    pub meta: Metadata,
}

impl Document {
    pub fn validate(&self) -> Result<(), BlogError> {
        if self.title.trim().is_empty() {
            return Err(BlogError::InvalidDocument("title is empty".into()));
        }
        if !self.sections.iter().any(|s| !s.trim().is_empty()) {
            return Err(BlogError::InvalidDocument(format!(
                "{:?} has no content sections",
                self.title
            )));
        }
        Ok(())
    }

    /// Body without the title line, as sent to the publishing API.
    pub fn body(&self) -> String {
        std::iter::once(&self.lead)
            .chain(&self.sections)
            .chain(std::iter::once(&self.footer))
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn render(&self) -> String {
        format!("# {}\n\n{}\n", self.title, self.body())
    }
}
