//! HTTP API handlers for the blog service

pub mod auth;
pub mod generate;
pub mod health;
pub mod images;
pub mod newsletter;
pub mod og;
pub mod posts;
