//! Product catalog reports.
//!
//! The crate fetches a product catalog, aggregates it per category and exports a paginated
//! landscape PDF with a product table and two charts. [`export::ReportAssembler`] drives the
//! whole export; the other modules are usable on their own.

pub mod aggregate;
pub mod builder;
pub mod charts;
pub mod config;
pub mod document;
pub mod elements;
pub mod export;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod product;
pub mod richtext;
pub mod source;
pub mod table;
