//! Reusable HTML components for page generation
//!
//! Maud components wrapping rendered markdown into complete pages, such as
//! the standalone preview written by the command line tool.

pub mod layout;
