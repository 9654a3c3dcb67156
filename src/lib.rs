//! Blogsmith - a small blog with a house price estimator
//!
//! This library provides the blog post store, form validation, the price
//! estimator and the HTTP layer that serves them.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
