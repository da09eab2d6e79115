//! # Book Reader - Order Book Log Normalization
//!
//! This crate turns raw exchange book data into one canonical columnar table
//! that a dashboard can filter and chart without caring where the data came
//! from.
//!
//! ## Architecture
//!
//! - **Parser**: line-format reader for free-text book update logs (`.data`)
//! - **Top**: top-of-book snapshot reader for columnar files (`.csv`)
//! - **Reader**: the shared `DataReader` contract, validation and cache persistence
//! - **Table**: the canonical table and its column kinds
//! - **Store**: extension dispatch and the on-disk cache
//! - **Filter / Views**: dashboard row selection and chart data
//!
//! ## Example
//!
//! ```rust,no_run
//! use book_reader::{
//!     filter::Selection,
//!     reader::{DataReader, ReaderKind},
//! };
//! use std::path::Path;
//!
//! let path = Path::new("data/data_lines.data");
//! let table = ReaderKind::from_path(path)?.load(path)?;
//!
//! let morning = Selection { hour: Some(6..=10), ..Selection::default() };
//! let view = morning.apply(&table)?;
//! println!("{} of {} rows", view.len(), table.len());
//! # Ok::<(), book_reader::error::ReadError>(())
//! ```
pub mod config;
pub mod error;
pub mod filter;
pub mod generate;
pub mod metrics;
pub mod parser;
pub mod reader;
pub mod store;
pub mod table;
pub mod time;
pub mod top;
pub mod views;
