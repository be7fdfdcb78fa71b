pub mod api;
pub mod config;
pub mod credibility;
pub mod data_models;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod reasoning;
pub mod report;
pub mod scrapper;
pub mod search;
