//! Per-user settings, currently just the display currency.
//!
//! A user must pick a currency before the dashboard will render, so the
//! settings page doubles as a first-run wizard after registration.

mod db;
mod domain;
mod page;

pub use db::{create_user_settings_table, get_user_settings, upsert_user_settings};
pub use domain::{Currency, UserSettings};
pub use page::{get_settings_page, post_settings};
