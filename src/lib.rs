pub mod app;
pub mod auth;
pub mod blogs;
pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod memory;
pub mod state;
pub mod storage;
