//! School Directory
//!
//! An HTTP service for submitting school records with an image and listing
//! them back, plus the client used to submit them.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod storage;
pub mod validation;
