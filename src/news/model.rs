use serde::{Deserialize, Serialize};

pub const NO_AUTHOR: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    publication_date: String,
    title: String,
    section: String,
    url: String,
    author: String,
}

impl Story {
    pub fn new(
        publication_date: impl Into<String>,
        title: impl Into<String>,
        section: impl Into<String>,
        url: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            publication_date: publication_date.into(),
            title: title.into(),
            section: section.into(),
            url: url.into(),
            author: author.into(),
        }
    }

    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}
