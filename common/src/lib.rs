// Shared engine for the lecture reminder bot: domain model, persistence,
// the timer registry, schedule reconciliation, reminder dispatch, command
// parsing and user-facing replies. Transport-free; the Telegram side lives
// in the bot binary.

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod parity;
pub mod reconciler;
pub mod registry;
pub mod replies;
pub mod service;
pub mod store;
