pub mod action;
pub mod app;
pub mod channel;
pub mod chat;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod logging;
pub mod script;
pub mod session;
