//! LawLord: conversational legal intake.
//!
//! Interviews a prospective client, classifies the matter against a
//! catalog of case types, gathers the facts each case type needs, and
//! produces a structured evaluation report for the firm's attorneys.
//!
//! Language understanding is delegated to an LLM through [`oracle`];
//! everything else (state machine, fact scheduling, policies) is
//! deterministic and lives in [`intake`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod intake;
pub mod knowledge;
pub mod oracle;
pub mod report;

pub mod server;
