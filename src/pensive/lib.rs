//! # Pensive Architecture
//!
//! Pensive is a **UI-agnostic knowledge organizer**. Entries are filed under
//! tags and grouped into categories; each category is bound to one entry
//! format when it is created:
//!
//! - **Format 0**: one free-text note per tag
//! - **Format 1**: any number of titled notes per tag
//! - **Format 2**: titled notes with an attachment (URL, file path or tag)
//!
//! A tag cuts across every category: asking for a tag shows what each
//! category holds for it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, launches the editor           │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Resolves letters (A, B3, C@tag) to categories            │
//! │  - Owns the catalog, refreshed after every write            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Pure business logic                                      │
//! │  - Operates on Rust types, returns Rust types               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract DataStore trait                                 │
//! │  - SqliteStore (production), InMemoryStore (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Addressing
//!
//! Categories have a stable id in the store and a dense ordinal that users
//! see as a letter. Titled entries are addressed by display index, their rank
//! by position within a tag. See [`index`] for the selector grammar.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns
//! `Result<CmdResult>`. It never writes to stdout or stderr and never exits
//! the process. Logging goes through `tracing`; whoever runs the library
//! decides where it ends up.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests of the business logic against
//!    [`store::memory::InMemoryStore`]. Most tests live here.
//! 2. **Store** (`store/sqlite.rs`): constraint mapping, cascades and
//!    first-run initialization against real SQLite files.
//! 3. **API** (`api.rs`): dispatch, selector resolution and catalog refresh.
//! 4. **CLI** (`tests/`): the binary end to end with an isolated data directory.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Category`, `Entry`, `Format`, `Catalog`)
//! - [`index`]: Category letters and entry selectors
//! - [`tags`]: Tag name rules and `*` patterns
//! - [`highlight`]: Search and tag highlighting
//! - [`attachment`]: Attachment kinds and existence probes
//! - [`editor`]: External editor round trip
//! - [`launcher`]: Opening attachments
//! - [`config`]: Configuration and data directory
//! - [`error`]: Error types
//! - `cli`: Argument parsing, prompts and printing for the binary (not part of the lib API)

pub mod api;
pub mod attachment;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod index;
pub mod launcher;
pub mod model;
pub mod store;
pub mod tags;
