//! Data models
//!
//! Database entities and the input types used to create and update them.

mod post;

pub use post::{format_post_date, today, BlogPost, PostFields, UpdatePostInput, POST_DATE_FORMAT};
