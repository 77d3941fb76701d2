//! Kconfig parsing, dependency-graph construction, and expression evaluation.
//!
//! [`parser::KConfig`] parses a Kconfig file (following `source` directives) into a block tree.
//! [`SymbolGraph::build`] flattens that tree into a graph of symbols, choices, and menus with
//! dependency edges, and [`Evaluator`] evaluates expressions against the graph and a caller-owned
//! [`Assignment`] of symbol values.
#![warn(clippy::all)]
#![allow(clippy::result_large_err)]
#![warn(missing_docs)]

mod context;
mod eval;
mod graph;

pub mod parser;
pub use {context::*, eval::*, graph::*};
