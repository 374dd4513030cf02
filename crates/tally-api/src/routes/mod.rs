//! Route modules for the API server
//!
//! - load: health, retrieval status and reloads
//! - view: derived view reads (summary, table pages, options, charts)
//! - filters: filter, sort and page mutations
//! - settings: active configuration

pub mod filters;
pub mod load;
pub mod settings;
pub mod view;
