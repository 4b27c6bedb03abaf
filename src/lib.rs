pub mod banner;
pub mod cancel;
pub mod client;
pub mod commands;
pub mod config;
pub mod consts;
pub mod controller;
pub mod error;
pub mod events;
pub mod query;
pub mod render;
pub mod spinner;
