pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod feedback;
pub mod logging;
pub mod token_store;
pub mod transcript;
pub mod types;
#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
