//! Common utilities and shared types for hdo-rs.
//!
//! This crate provides foundational components used across all hdo-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Localization**: Display strings for symbolic keys via [`Localizer`]
//! - **Slugs**: URL-friendly identifiers derived from titles via [`slugify`]
//!
//! # Example
//!
//! ```no_run
//! use hdo_common::{AppResult, Config, Localizer};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let localizer = Localizer::from_config(&config.locale);
//!     println!("{}", localizer.t("app.nobody"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod i18n;
pub mod slug;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use i18n::Localizer;
pub use slug::slugify;
