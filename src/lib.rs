pub mod app;
pub mod config;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;
