//! # Job Wrecker Library
//!
//! This library converts Jenkins job definitions (`config.xml`) into YAML
//! suitable for Jenkins Job Builder. It is designed to be used by the
//! `job-wrecker` command-line tool but can also be embedded in other
//! migration tooling.
//!
//! ## Quick Example
//!
//! ```
//! use job_wrecker::registry::translate_job;
//! use job_wrecker::tree::parse_document;
//! use job_wrecker::writer::job_document;
//!
//! let xml = "<project><description>nightly build</description></project>";
//! let root = parse_document(xml).unwrap();
//! let scope = translate_job(&root).unwrap();
//! let yaml = job_document("nightly", &scope);
//! assert_eq!(yaml, "- job:\n    name: nightly\n    description: nightly build\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Source tree (`tree`)**: A simplified, owned view of the parsed XML
//!   document that handlers walk, with the original markup of every element
//!   kept alongside for fallback output.
//! - **Values (`value`)**: The order-preserving YAML data model translations
//!   are built from, plus the coercion rules for element text.
//! - **Handlers (`handlers`)**: Per-construct translators for builders,
//!   publishers, SCM blocks, triggers, wrappers, properties, and the simple
//!   one-element settings.
//! - **Registry (`registry`)**: The tag-to-handler table and the top-level
//!   dispatch across a job document's children.
//! - **Writer (`writer`)**: Block-style YAML rendering with literal scalars
//!   for multi-line text.
//!
//! ## Fallback Behavior
//!
//! A construct no handler recognizes never aborts the surrounding job.
//! Inside a container (builders, publishers, and the like) the offending
//! element degrades to a `raw` block carrying its verbatim XML, and its
//! siblings translate normally. Only an unknown top-level setting or job
//! kind fails the whole conversion.

pub mod defaults;
pub mod error;
pub mod handlers;
pub mod merge;
pub mod registry;
pub mod tree;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
