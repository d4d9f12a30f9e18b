//! Deferred-rendering text construction for code generators.
//!
//! Content is appended to a [`Module`] incrementally and possibly out of
//! order; indentation is structural rather than literal whitespace, and
//! values such as argument lists stay mutable until the text is rendered.
//!
//! # Module Organization
//!
//! - [`value`] - Deferred-stringification primitives ([`Format`], [`Join`], ...)
//! - [`token`] / [`body`] - What a module body is made of
//! - [`lexer`], [`parser`], [`emitter`] - The render pipeline
//! - [`module`] - The builder facade ([`Module`], [`ScopeGuard`])
//! - [`config`] - Rendering options ([`ModuleOptions`], [`Indent`])
//! - [`names`] - Collision-free declaration names ([`NameStore`])

pub mod body;
pub mod config;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod module;
pub mod names;
pub mod parser;
pub mod token;
pub mod value;

pub use body::Body;
pub use config::{Indent, ModuleOptions};
pub use emitter::Emitter;
pub use error::{Error, Result};
pub use lexer::{Lexeme, Lexer, Sentence};
pub use module::{Module, Pipeline, ScopeGuard};
pub use names::NameStore;
pub use parser::{Frame, FrameItem, Parser};
pub use token::{Expand, ExpandContext, Newline, Token};
pub use value::{ArgsAndKwargs, ArgumentList, Deferred, Format, Join, KeywordList, Piece};
