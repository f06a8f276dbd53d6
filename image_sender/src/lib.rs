//! Upload images to a running `classify_server`.
pub mod sender;
