//! # regprune Core
//!
//! Core types for the regprune registry retention tool.
//!
//! This crate holds everything that does not touch the network:
//!
//! - [`RetentionRule`] / [`RetentionPolicy`] - validated "keep last N tags" rules
//! - [`parse_config`] / [`load_policy`] - the `key=value` configuration format
//! - [`select_for_deletion`] - numeric ordering and boundary arithmetic that
//!   decides which tags fall outside the retention window
//!
//! ## Example
//!
//! ```rust
//! use regprune_core::{select_for_deletion, RetentionPolicy};
//!
//! let policy = RetentionPolicy::parse("# keep three builds\napps/web = 3\n");
//! let rule = policy.get("apps/web").unwrap();
//!
//! let selection = select_for_deletion(&["1", "2", "3", "4", "5"], rule.keep_count);
//! assert_eq!(selection.candidate_values(), vec![1, 2]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod rule;
pub mod selection;


pub use config::{load_policy, parse_config};
pub use error::{Error, Result};
pub use rule::{RejectedRule, RetentionPolicy, RetentionRule};
pub use selection::{select_for_deletion, NumericTag, Selection};
