//! Blog post model

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date format used for `BlogPost::date`, e.g. "October 19, 2026"
pub const POST_DATE_FORMAT: &str = "%B %d, %Y";

/// Blog post entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Unique identifier, assigned by the database and never reused
    pub id: i64,
    /// Post title, unique across all posts
    pub title: String,
    pub subtitle: String,
    /// Human-readable date of creation or of the last edit
    pub date: String,
    /// Rich text (HTML) body
    pub body: String,
    /// Author display name
    pub author: String,
    /// Background image URL
    pub img_url: String,
}

impl BlogPost {
    /// Apply a partial update, leaving `None` fields untouched.
    ///
    /// The date is not touched here; the service stamps it.
    pub fn apply(&mut self, input: UpdatePostInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(subtitle) = input.subtitle {
            self.subtitle = subtitle;
        }
        if let Some(body) = input.body {
            self.body = body;
        }
        if let Some(author) = input.author {
            self.author = author;
        }
        if let Some(img_url) = input.img_url {
            self.img_url = img_url;
        }
    }
}

/// A validated, complete set of post fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub author: String,
    pub img_url: String,
}

/// Input for updating a post; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub img_url: Option<String>,
}

impl UpdatePostInput {
    /// Update only the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

impl From<PostFields> for UpdatePostInput {
    fn from(fields: PostFields) -> Self {
        Self {
            title: Some(fields.title),
            subtitle: Some(fields.subtitle),
            body: Some(fields.body),
            author: Some(fields.author),
            img_url: Some(fields.img_url),
        }
    }
}

/// Format a date the way posts display it
pub fn format_post_date(date: NaiveDate) -> String {
    date.format(POST_DATE_FORMAT).to_string()
}

/// Today's date in post format, in the server's local time zone
pub fn today() -> String {
    format_post_date(Local::now().date_naive())
}
