pub mod config;
pub mod controller;
pub mod endpoint;
pub mod handle;
pub mod history;
