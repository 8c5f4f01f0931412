#![doc = "source-atlas: structural maps of source trees for LLM consumption."]

//! Walks a local directory or a hosted repository, classifies every file by
//! extension, parses it into a structural representation (syntax tree,
//! derived schema, document tree or rule tree), optionally annotates it with
//! a summary from a rate-limited completion service, and writes the result as
//! one cycle-safe JSON document.
//!
//! # Usage
//! The binary wraps [`pipeline::Pipeline`]; see [`cli`] for the commands.
//! External services are reached only through the traits in [`contract`].

pub mod classify;
pub mod cli;
pub mod completion;
pub mod config;
pub mod contract;
pub mod download;
pub mod graph;
pub mod load_config;
pub mod parse;
pub mod pipeline;
pub mod publish;
pub mod rate_limit;
pub mod schema;
pub mod serialize;
pub mod summarize;
pub mod walk;
