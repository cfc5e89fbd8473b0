//! User-defined categories for labelling transactions.

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    create_category, create_category_table, get_categories, get_category_by_name,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryName};
pub use list::get_categories_page;
