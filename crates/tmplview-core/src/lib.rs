//! Core library for tmplview.
//!
//! Provides the [`manager::Manager`], which resolves named template fragments through a pluggable
//! [`loader::Loader`], compiles them with Handlebars, optionally caches the compiled trees, and
//! composes a layout with a content fragment through reserved names (`@layout`, `@content`).
//!
//! ```ignore
//! use std::sync::Arc;
//! use tmplview_core::{loader::FsLoader, manager::Manager};
//!
//! let views = Manager::new("templates", Arc::new(FsLoader), true);
//! views.render_in_layout(std::io::stdout(), "pages/hello.html", "layouts/app.html", &data)?;
//! ```

mod cache;
pub mod config;
pub mod error;
mod fragment;
pub mod funcs;
pub mod loader;
pub mod manager;
pub mod path;

pub use error::{Result, TmplviewError};
pub use manager::{Manager, ManagerBuilder};
