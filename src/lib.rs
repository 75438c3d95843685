pub mod audit;
pub mod authz;
pub mod config;
pub mod db;
pub mod domain;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
