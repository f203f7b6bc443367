pub mod actions;
pub mod handlers;
pub mod language;
pub mod masking;
pub mod merge;
pub mod service;
pub mod transfer;
