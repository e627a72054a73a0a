//! Validated paths for addressing nodes in a hierarchical key-value store.
//!
//! A hosted reactive store addresses every node with a slash-separated path
//! such as `/signup/north-side/` or `north-side/users/-k0001`. This crate
//! normalises those strings into a list of validated segments so adapters and
//! domain code can compare, extend, and render paths without re-parsing.
//!
//! # Example
//!
//! ```
//! use store_path::StorePath;
//!
//! let users = StorePath::parse("north-side/users").expect("valid path");
//! let node = users.child("-k0001").expect("valid key");
//!
//! assert_eq!(node.to_string(), "/north-side/users/-k0001");
//! assert!(node.starts_with(&users));
//! assert_eq!(node.last(), Some("-k0001"));
//! ```

mod error;
mod path;
mod segment;

pub use error::StorePathError;
pub use path::StorePath;
pub use segment::{FORBIDDEN_CHARACTERS, validate_segment};
