//! # Flooring Architecture
//!
//! Flooring is an **order storage library** for a flooring-installation
//! business. Orders are kept in memory, partitioned by fulfillment date, and
//! persisted as one delimited text file per date. The bundled binary is one
//! thin client of the library; any other front end talks to the same API.
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Resolves catalog keys, validates names and areas         │
//! │  - Reprices edited orders                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract DataStore trait                                 │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments, returns regular
//! Rust types, and never writes to stdout/stderr or exits the process. File
//! access happens only inside a [`store::backend::StorageBackend`].
//!
//! ## Money
//!
//! Every amount is a [`rust_decimal::Decimal`] carrying exactly two fractional
//! digits, rounded half-up at each step of the calculation in [`pricing`].
//!
//! ## Module Overview
//!
//! - [`api`]: the facade collaborators call
//! - [`catalog`]: products and state taxes, keyed for lookup
//! - [`config`]: `config.json` in the flooring home
//! - [`error`]: [`error::FlooringError`] and the crate `Result`
//! - [`model`]: orders, products, state taxes
//! - [`pricing`]: cost calculation
//! - [`store`]: storage abstraction, record codec and backends

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod pricing;
pub mod store;
