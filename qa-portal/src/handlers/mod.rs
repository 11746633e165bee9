pub mod app;
pub mod auth;
pub mod chat;
pub mod diagnostics;
pub mod generate;
pub mod metrics;
pub mod pages;
