pub mod acl;
pub mod app;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod http;
pub mod metrics;
pub mod teams;
