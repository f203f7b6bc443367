pub mod chat;
pub mod cv;
pub mod patch;
