//! Builds the indentation tree from the lexer output.

use std::mem;

use crate::{
    error::{Error, Result},
    lexer::{Lexeme, Sentence},
};

/// One nesting level of output.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    depth: usize,
    items: Vec<FrameItem>,
}

#[derive(Debug, Clone)]
pub enum FrameItem {
    Sentence(Sentence),
    Frame(Frame),
}

impl Frame {
    /// The depth-0 frame every parse starts from.
    pub fn root() -> Self {
        Self::default()
    }

    fn child_of(parent: &Frame) -> Self {
        Self {
            depth: parent.depth + 1,
            items: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn items(&self) -> &[FrameItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deepest nesting level reachable from this frame.
    pub fn max_depth(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| match item {
                FrameItem::Frame(child) => Some(child.max_depth()),
                FrameItem::Sentence(_) => None,
            })
            .max()
            .unwrap_or(self.depth)
    }
}

/// Turns [`Lexeme`]s into a [`Frame`] tree.
///
/// Every indent/unindent pair yields exactly one child frame, even when
/// nothing was written between them.
#[derive(Debug, Clone, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, lexemes: Vec<Lexeme>) -> Result<Frame> {
        let mut current = Frame::root();
        let mut parents: Vec<Frame> = Vec::new();

        for (position, lexeme) in lexemes.into_iter().enumerate() {
            match lexeme {
                Lexeme::Indent => {
                    let child = Frame::child_of(&current);
                    parents.push(mem::replace(&mut current, child));
                }
                Lexeme::Unindent => {
                    let Some(parent) = parents.pop() else {
                        return Err(Box::new(Error::UnmatchedUnindent { position }));
                    };
                    let child = mem::replace(&mut current, parent);
                    current.items.push(FrameItem::Frame(child));
                }
                Lexeme::Sentence(sentence) => current.items.push(FrameItem::Sentence(sentence)),
            }
        }

        if !parents.is_empty() {
            return Err(Box::new(Error::UnclosedIndent {
                depth: parents.len(),
            }));
        }
        Ok(current)
    }
}
