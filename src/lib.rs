pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod redirect;
pub mod registry;
pub mod storage;
pub mod validator;
