//! Calls that explode onto several lines when they get too wide.

use indexmap::IndexMap;
use scribe_core::{ArgumentList, Expand, ExpandContext, Format, Piece, Result, Token};

/// `name(arg, ...)` on a single line.
pub(crate) fn single_line(name: &Piece, args: &[Piece]) -> Format {
    Format::new("{}({})")
        .arg(name.clone())
        .arg(ArgumentList::new(args.iter().cloned()))
}

/// Arguments for a call that are collected before it is written.
///
/// Handed to the closure of [`PythonModule::hugecall`]; keyword arguments
/// come after positional ones, in the order they were first added.
///
/// [`PythonModule::hugecall`]: crate::PythonModule::hugecall
#[derive(Debug)]
pub struct Caller {
    name: Piece,
    args: Vec<Piece>,
    kwargs: IndexMap<String, Piece>,
}

impl Caller {
    pub(crate) fn new(name: Piece) -> Self {
        Self {
            name,
            args: Vec::new(),
            kwargs: IndexMap::new(),
        }
    }

    pub fn arg(&mut self, value: impl Into<Piece>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    /// Add a keyword argument; adding the same keyword again replaces its value.
    pub fn kwarg(&mut self, name: impl Into<String>, value: impl Into<Piece>) -> &mut Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.args.len() + self.kwargs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call head and the argument expressions in call order.
    pub(crate) fn into_parts(self) -> (Piece, Vec<Piece>) {
        let mut args = self.args;
        args.extend(
            self.kwargs
                .into_iter()
                .map(|(name, value)| Piece::from(Format::new("{}={}").arg(name).arg(value))),
        );
        (self.name, args)
    }
}

/// One argument per line, the last one closing the parenthesis:
///
/// ```text
/// name(
///     first,
///     second)
/// ```
#[derive(Debug)]
pub(crate) struct ExplodedCall {
    pub(crate) name: Piece,
    pub(crate) args: Vec<Piece>,
}

impl Expand for ExplodedCall {
    fn expand(&self, cx: &ExpandContext<'_>) -> Result<Vec<Token>> {
        let Some((last, init)) = self.args.split_last() else {
            return Ok(vec![single_line(&self.name, &[]).into(), Token::NEWLINE]);
        };

        let mut tokens = Vec::with_capacity(self.args.len() * 2 + 5);
        if !cx.at_line_start() {
            tokens.push(Token::NEWLINE);
        }
        tokens.push(Format::new("{}(").arg(self.name.clone()).into());
        tokens.push(Token::NEWLINE);
        tokens.push(Token::Indent);
        for arg in init {
            tokens.push(Format::new("{},").arg(arg.clone()).into());
            tokens.push(Token::NEWLINE);
        }
        tokens.push(Format::new("{})").arg(last.clone()).into());
        tokens.push(Token::NEWLINE);
        tokens.push(Token::Unindent);
        Ok(tokens)
    }
}
