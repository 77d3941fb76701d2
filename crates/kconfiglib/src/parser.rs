//! Kconfig parser.
//!
//! The parser turns Kconfig text into a tree of [`Block`] values. Tokenization splits the input
//! into logical lines of [`LocToken`]s first; block parsers then consume whole lines. Every
//! token, string, and expression carries the [`Location`] it was read from.

mod block;
mod choice;
mod comment;
mod config;
mod error;
mod expr;
mod ifblock;
mod integer;
mod kconfig;
mod lit_value;
mod located;
mod location;
mod menu;
mod prompt;
mod source;
mod streams;
mod string_literal;
mod token;
mod types;

pub use {
    block::*, choice::*, comment::*, config::*, error::*, expr::*, ifblock::*, kconfig::*, lit_value::*, located::*,
    location::*, menu::*, prompt::*, source::*, streams::*, token::*, types::*,
};

pub(crate) use lit_value::write_str_lit;
