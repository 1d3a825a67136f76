//! # strata-core
//!
//! Editing backend for Strata wallpaper scenes: the document controller,
//! the CAML codec, the emitter preview and persistence, independent of any
//! UI.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata_core::config::Config;
//! use strata_core::editor::DocumentController;
//! use strata_core::store::SqliteStore;
//! use strata_core::action::{DomainAction, LayerAction, ViewAction};
//!
//! let config = Config::load();
//! let store = SqliteStore::open(&SqliteStore::default_path())?;
//! let mut editor = DocumentController::open(store, "project-id", config.editor_settings())?;
//!
//! // Edits are undoable and schedule a debounced save.
//! editor.dispatch(&DomainAction::View(kind, ViewAction::Layer(LayerAction::Add(layer))));
//!
//! // Drive the debounce from the host's event loop.
//! editor.tick(std::time::Instant::now());
//! ```
//!
//! ## Module Overview
//!
//! - [`editor`]: `DocumentController`, undo history, save scheduling,
//!   clipboard and asset sweep
//! - [`action`]: action enums (re-exported) and `DispatchResult`
//! - [`codec`]: CAML serialize/parse
//! - [`emitter`]: particle simulator and preview host
//! - [`store`]: `ProjectStore` plus in-memory and SQLite stores
//! - [`config`]: TOML configuration
//! - [`error`]: `StrataError`

pub mod action;
pub mod codec;
pub mod config;
pub mod editor;
pub mod emitter;
pub mod error;
pub mod store;

pub use error::{Result, StrataError};
