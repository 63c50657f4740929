pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod research;
pub mod upstream;
