//! Configuration model for editlock.
//!
//! The config lives at `.editlock/config.yaml`. Parsing is forward compatible
//! (unknown fields are ignored), every field has a default, and values are
//! validated after loading.

mod model;
mod operations;
pub mod types;


pub use model::Config;
