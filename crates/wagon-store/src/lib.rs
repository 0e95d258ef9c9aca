//! # wagon-store
//!
//! SQLite-backed relational layer: users, groups, members, subscribers,
//! messages, and campaigns, with pagination/search list operations.

pub mod models;
pub mod store;

pub use store::{CampaignUpdate, GroupUpdate, Page, Pagination, Store, SubscriberUpdate};
