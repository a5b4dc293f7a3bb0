//! Functional core for formdesk.
//!
//! Domain types, inbound validation, the single-table key scheme and the
//! repository traits. Nothing in this crate performs I/O.

pub mod service;
pub mod storage;
