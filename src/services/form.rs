//! Post form handling
//!
//! `PostForm` holds raw, untrusted field values exactly as submitted.
//! `PostForm::validate` turns them into `PostFields` or reports every
//! failing field at once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::models::{BlogPost, PostFields, UpdatePostInput};

/// Maximum length of the VARCHAR(250) columns
pub const MAX_FIELD_LEN: usize = 250;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_URL_MESSAGE: &str = "Invalid URL.";

/// Raw form submission for creating or editing a post
///
/// Missing fields deserialize as empty strings so they surface as
/// validation errors instead of extractor rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub img_url: String,
}

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field, empty if it passed
    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl PostForm {
    /// Pre-populate the form from an existing post
    pub fn from_post(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            body: post.body.clone(),
            author: post.author.clone(),
            img_url: post.img_url.clone(),
        }
    }

    /// Validate every field, trimming surrounding whitespace
    pub fn validate(&self) -> Result<PostFields, FormErrors> {
        let mut errors = FormErrors::new();

        let title = check_text(&mut errors, "title", &self.title, Some(MAX_FIELD_LEN));
        let subtitle = check_text(&mut errors, "subtitle", &self.subtitle, Some(MAX_FIELD_LEN));
        let body = check_text(&mut errors, "body", &self.body, None);
        let author = check_text(&mut errors, "author", &self.author, Some(MAX_FIELD_LEN));
        let img_url = check_url(&mut errors, "img_url", &self.img_url);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PostFields {
            title,
            subtitle,
            body,
            author,
            img_url,
        })
    }
}

/// Validate only the fields present in a partial update
///
/// Returns the input with every present value trimmed.
pub fn validate_update(input: UpdatePostInput) -> Result<UpdatePostInput, FormErrors> {
    let mut errors = FormErrors::new();

    let checked = UpdatePostInput {
        title: input
            .title
            .map(|v| check_text(&mut errors, "title", &v, Some(MAX_FIELD_LEN))),
        subtitle: input
            .subtitle
            .map(|v| check_text(&mut errors, "subtitle", &v, Some(MAX_FIELD_LEN))),
        body: input.body.map(|v| check_text(&mut errors, "body", &v, None)),
        author: input
            .author
            .map(|v| check_text(&mut errors, "author", &v, Some(MAX_FIELD_LEN))),
        img_url: input.img_url.map(|v| check_url(&mut errors, "img_url", &v)),
    };

    if errors.is_empty() {
        Ok(checked)
    } else {
        Err(errors)
    }
}

fn check_text(errors: &mut FormErrors, field: &str, value: &str, max_len: Option<usize>) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
    } else if let Some(max) = max_len {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("Field cannot be longer than {} characters.", max),
            );
        }
    }
    value.to_string()
}

fn check_url(errors: &mut FormErrors, field: &str, value: &str) -> String {
    let value = check_text(errors, field, value, Some(MAX_FIELD_LEN));
    if !value.is_empty() && !is_valid_url(&value) {
        errors.add(field, INVALID_URL_MESSAGE);
    }
    value
}

/// An absolute URL with a scheme and a host
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Any form with non-blank short text and an http(s) URL validates,
        /// and validation only trims.
        #[test]
        fn non_blank_fields_validate(
            title in "[A-Za-z0-9][A-Za-z0-9 ]{0,40}",
            author in "[A-Za-z][A-Za-z ]{0,30}",
            host in "[a-z]{1,12}\\.(com|org|net)",
            path in "[a-z0-9/]{0,20}",
        ) {
            let form = PostForm {
                title: title.clone(),
                subtitle: "subtitle".to_string(),
                body: "<p>body</p>".to_string(),
                author: author.clone(),
                img_url: format!("https://{}/{}", host, path),
            };

            let fields = form.validate().expect("should validate");
            prop_assert_eq!(fields.title, title.trim());
            prop_assert_eq!(fields.author, author.trim());
        }

        /// Blank titles always fail, whatever else is submitted.
        #[test]
        fn blank_title_always_fails(blank in "[ \t\n]{0,5}", body in ".{0,40}") {
            let form = PostForm {
                title: blank,
                subtitle: "s".to_string(),
                body,
                author: "a".to_string(),
                img_url: "https://example.com".to_string(),
            };

            let errors = form.validate().unwrap_err();
            prop_assert_eq!(errors.for_field("title"), &[REQUIRED_MESSAGE.to_string()]);
        }
    }
}
