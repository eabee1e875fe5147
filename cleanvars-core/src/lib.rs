// cleanvars-core/src/lib.rs
//! # CleanVars Core Library
//!
//! `cleanvars-core` scrubs secrets and personal data out of Ansible
//! variable files, playbooks and similar YAML/INI-like text, including
//! text too broken for a real YAML parser to load. The central piece is a
//! tolerant character-level parser that turns any input into a typed node
//! chain, then identifies the values of sensitive-looking keys and
//! substitutes them with Jinja2-style placeholders. A set of regex-based
//! scrubbers handles emails, IP and MAC addresses, SSNs, phone numbers,
//! credit cards, comments and home-directory user names around the core.
//!
//! Every pass accepts arbitrary input and never fails; replacement values
//! are deterministic so identical inputs scrub identically across runs.
//!
//! ## Modules
//!
//! * `node`: The typed node chain and its arena.
//! * `tokenizer`: The tolerant character-level tokenizer and quote repair.
//! * `multiline`: Folds YAML block scalars into single value nodes.
//! * `merge`: Consolidates fragmented unquoted value spans.
//! * `identify`: Tags the values of sensitive keys as secrets.
//! * `render`: Renders the chain back to text, substituting secrets.
//! * `fields`: Field-name deny/allow lists and value-shape checks.
//! * `scrubbers`: The regex scrubbers and the [`scrub`] pipeline.
//! * `validators`: Structural checks backing the regex scrubbers.
//! * `errors`: The library error type.
//!
//! ## Usage Example
//!
//! ```rust
//! use cleanvars_core::scrub;
//!
//! let input = "ansible_password: '!234AaAa56'";
//! assert_eq!(scrub(input), "ansible_password: '{{ ansible_password }}'");
//! ```
//!
//! License: MIT OR APACHE 2.0

pub mod errors;
pub mod fields;
pub mod identify;
pub mod merge;
pub mod multiline;
pub mod node;
pub mod render;
pub mod scrubbers;
pub mod tokenizer;
pub mod validators;

pub use errors::ScrubError;
pub use node::{Node, NodeArena, NodeId, NodeKind};
pub use render::{hide_secrets, render, ValueTemplate};
pub use scrubbers::{scrub, scrub_with_template};
