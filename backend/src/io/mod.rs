//! # IO Module
//!
//! Interface layer exposing the ledger to the office front end. REST over
//! HTTP is the only interface; handlers stay thin and delegate to the
//! domain services held in [`crate::AppState`].

pub mod rest;

pub use rest::api_router;
