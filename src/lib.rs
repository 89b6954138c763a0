//! This module contains the core logic of the viewgate layer.
//!
//! Viewgate glues a logical post-action intent to an HTTP response: a full
//! page redirect for ordinary requests, or a structured JSON body bundling
//! freshly rendered content, breadcrumb markup and flash messages for
//! asynchronous (XHR) requests. Textual action identifiers of the form
//! `component:handler:action` are resolved against a registry of handlers.

pub mod auth;
pub mod compose;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod i18n;
pub mod logging;
pub mod render;
pub mod router;
pub mod search;
pub mod session;
pub(crate) mod utils;
