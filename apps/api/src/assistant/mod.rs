pub mod handlers;
pub mod prompts;
pub mod response_parser;
pub mod service;
pub mod session;
