//! Mossberry Catalog - product catalog storage core.
//!
//! This crate is the data-access layer for the shop's catalog database:
//!
//! - [`db::ProductRepository`] - filtered/sorted/paginated product queries
//!   with batched sub-record hydration (category, inventory, discount)
//! - [`db::HighlightRepository`] - the three positional featured-product slots
//! - [`db::CategoryRepository`], [`db::InventoryRepository`],
//!   [`db::DiscountRepository`] - sub-record CRUD
//! - [`db::PostRepository`] - blog posts
//! - [`db::VisitorRepository`] - visitor sessions and page views
//! - [`db::ReportingRepository`] - trailing-N-day sales/visitor series
//! - [`basket::BasketStore`] - session-scoped in-memory shopping baskets
//!
//! There is no HTTP surface here; the web layer consumes these types
//! in-process. Every operation borrows the shared [`sqlx::PgPool`] and is
//! independently consistent as of its own execution - no cross-call state,
//! no caching, no retries. Cancellation is drop-based: abandoning a future
//! rolls back any open transaction.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod basket;
pub mod db;
pub mod models;
