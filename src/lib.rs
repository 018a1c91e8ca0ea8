//! Membership checking for context-free grammars in Chomsky Normal Form.
//!
//! A [`grammar::Grammar`] is loaded once with [`parser::parse_file`] and can
//! then be shared by any number of [`chart::recognize`] calls. The [`batch`]
//! and [`scorer`] modules are the file-level glue around the recognizer.

pub mod batch;
pub mod chart;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod parser;
pub mod scorer;
