//! The vocabulary a [`Body`] is made of.

use std::{fmt, rc::Rc};

use crate::{
    body::Body,
    error::Result,
    lexer::Sentence,
    value::{ArgsAndKwargs, ArgumentList, Deferred, Format, Join, KeywordList, Piece},
};

/// Line terminator marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    Plain,
    /// A newline that also asks the emitter for an extra blank line when it
    /// ends a top-level sentence (e.g. two blank lines between definitions).
    Separator,
}

/// A token whose expansion into further tokens happens at lex time.
///
/// Because expansion is deferred to the last possible moment, an
/// implementation may keep accumulating state after it has been appended to
/// a body and the rendered output reflects its final state.
pub trait Expand: fmt::Debug {
    fn expand(&self, cx: &ExpandContext<'_>) -> Result<Vec<Token>>;
}

/// What the lexer knows at the point an [`Expand`] token is reached.
#[derive(Debug)]
pub struct ExpandContext<'a> {
    line: &'a Sentence,
}

impl<'a> ExpandContext<'a> {
    pub(crate) fn new(line: &'a Sentence) -> Self {
        Self { line }
    }

    /// The partially built line the expansion will continue.
    pub fn line(&self) -> &Sentence {
        self.line
    }

    /// Whether the current line is still blank, so that an expansion
    /// starting with its own lines does not need to break it first.
    pub fn at_line_start(&self) -> bool {
        self.line.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Token {
    Literal(String),
    Value(Rc<dyn Deferred>),
    Newline(Newline),
    Indent,
    Unindent,
    Expandable(Rc<dyn Expand>),
    /// A nested body, opaque to `insert_after` and `unnewline`.
    Body(Body),
    /// The one-line body written by `Module::stmt`.
    Line(Body),
}

impl Token {
    pub const NEWLINE: Self = Self::Newline(Newline::Plain);

    pub fn expandable(expansion: impl Expand + 'static) -> Self {
        Self::Expandable(Rc::new(expansion))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self, Self::Newline(_))
    }

    /// True for an empty literal, which contributes nothing to a line.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Literal(text) if text.is_empty())
    }
}

impl From<Piece> for Token {
    fn from(piece: Piece) -> Self {
        match piece {
            Piece::Text(text) => Self::Literal(text),
            Piece::Deferred(value) => Self::Value(value),
        }
    }
}

impl From<Body> for Token {
    fn from(body: Body) -> Self {
        Self::Body(body)
    }
}

impl From<Newline> for Token {
    fn from(newline: Newline) -> Self {
        Self::Newline(newline)
    }
}

macro_rules! impl_token_from_piece {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Token {
                fn from(value: $ty) -> Self {
                    Piece::from(value).into()
                }
            }
        )*
    };
}

impl_token_from_piece!(
    &str,
    String,
    &String,
    Format,
    &Format,
    Join,
    &Join,
    ArgumentList,
    &ArgumentList,
    KeywordList,
    &KeywordList,
    ArgsAndKwargs,
    &ArgsAndKwargs,
);
