//! Notes API: Cognito ID-token authorizer in front of a small notes CRUD service.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod response;
pub mod services;
pub mod state;
