//! Flattens a body into sentences and indentation markers.

use std::mem;

use tracing::trace;

use crate::{
    body::Body,
    error::{Error, Result},
    token::{ExpandContext, Newline, Token},
    value::Piece,
};

/// The content of one output line.
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pieces: Vec<Piece>,
    newline: Option<Newline>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, piece: impl Into<Piece>) {
        self.pieces.push(piece.into());
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The newline that terminated this sentence, if any.
    pub fn newline(&self) -> Option<Newline> {
        self.newline
    }

    /// True when no piece contributes content.
    pub fn is_empty(&self) -> bool {
        self.pieces.iter().all(Piece::is_blank)
    }

    /// Concatenate all pieces.
    pub fn render(&self) -> Result<String> {
        let mut line = String::new();
        for piece in &self.pieces {
            line.push_str(&piece.render()?);
        }
        Ok(line)
    }
}

/// Output of the [`Lexer`].
#[derive(Debug, Clone)]
pub enum Lexeme {
    Sentence(Sentence),
    Indent,
    Unindent,
}

/// Turns a [`Body`] into a flat list of [`Lexeme`]s.
///
/// Nested bodies dissolve into the stream and expandable tokens are expanded
/// in place. Indentation markers never terminate an open sentence.
#[derive(Debug, Clone, Default)]
pub struct Lexer;

#[derive(Default)]
struct LexState {
    lexemes: Vec<Lexeme>,
    current: Sentence,
    open_bodies: Vec<*const ()>,
}

impl Lexer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize(&self, body: &Body) -> Result<Vec<Lexeme>> {
        let mut state = LexState::default();
        self.feed_body(&mut state, body)?;
        if !state.current.is_empty() {
            state.lexemes.push(Lexeme::Sentence(state.current));
        }
        Ok(state.lexemes)
    }

    fn feed_body(&self, state: &mut LexState, body: &Body) -> Result<()> {
        let addr = body.addr();
        if state.open_bodies.contains(&addr) {
            return Err(Box::new(Error::BodyCycle));
        }
        state.open_bodies.push(addr);
        self.feed(state, body.tokens())?;
        state.open_bodies.pop();
        Ok(())
    }

    fn feed(&self, state: &mut LexState, tokens: Vec<Token>) -> Result<()> {
        for token in tokens {
            match token {
                Token::Newline(newline) => {
                    let mut done = mem::take(&mut state.current);
                    done.newline = Some(newline);
                    state.lexemes.push(Lexeme::Sentence(done));
                }
                Token::Expandable(expansion) => {
                    let expanded = expansion.expand(&ExpandContext::new(&state.current))?;
                    trace!(tokens = expanded.len(), ?expansion, "expanded token");
                    self.feed(state, expanded)?;
                }
                Token::Indent => state.lexemes.push(Lexeme::Indent),
                Token::Unindent => state.lexemes.push(Lexeme::Unindent),
                Token::Body(body) | Token::Line(body) => self.feed_body(state, &body)?,
                Token::Literal(text) => state.current.push(Piece::Text(text)),
                Token::Value(value) => state.current.push(Piece::Deferred(value)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Expand;

    fn shape(lexemes: &[Lexeme]) -> Vec<String> {
        lexemes
            .iter()
            .map(|l| match l {
                Lexeme::Sentence(s) => s.render().unwrap(),
                Lexeme::Indent => ">".to_string(),
                Lexeme::Unindent => "<".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_newline_splits_sentences() {
        let body = Body::new();
        body.push("a");
        body.push("b");
        body.push(Newline::Plain);
        body.push(Newline::Plain);
        body.push("c");

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), ["ab", "", "c"]);
    }

    #[test]
    fn test_trailing_blank_sentence_dropped() {
        let body = Body::new();
        body.push("a");
        body.push(Newline::Plain);
        body.push("");

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), ["a"]);
    }

    #[test]
    fn test_nested_bodies_dissolve() {
        let inner = Body::new();
        inner.push("b");
        let body = Body::new();
        body.push("a");
        body.push(inner.clone());
        body.push("c");
        inner.push("!");

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), ["ab!c"]);
    }

    #[test]
    fn test_indent_does_not_terminate_sentence() {
        let body = Body::new();
        body.push("a");
        body.push(Token::Indent);
        body.push("b");
        body.push(Newline::Plain);
        body.push(Token::Unindent);

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), [">", "ab", "<"]);
    }

    #[test]
    fn test_separator_newline_is_recorded() {
        let body = Body::new();
        body.push("a");
        body.push(Newline::Separator);

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        match &lexemes[0] {
            Lexeme::Sentence(s) => assert_eq!(s.newline(), Some(Newline::Separator)),
            other => panic!("expected sentence, got {:?}", other),
        }
    }

    #[derive(Debug)]
    struct Lines(Vec<&'static str>);

    impl Expand for Lines {
        fn expand(&self, cx: &ExpandContext<'_>) -> Result<Vec<Token>> {
            let mut tokens = Vec::new();
            if self.0.is_empty() {
                return Ok(tokens);
            }
            if !cx.at_line_start() {
                tokens.push(Token::NEWLINE);
            }
            for line in &self.0 {
                tokens.push(Token::from(*line));
                tokens.push(Token::NEWLINE);
            }
            Ok(tokens)
        }
    }

    #[test]
    fn test_expandable_breaks_open_line() {
        let body = Body::new();
        body.push("head");
        body.push(Token::expandable(Lines(vec!["x", "y"])));

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), ["head", "x", "y"]);
    }

    #[test]
    fn test_expandable_to_nothing() {
        let body = Body::new();
        body.push("a");
        body.push(Token::expandable(Lines(Vec::new())));
        body.push("b");

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), ["ab"]);
    }

    #[test]
    fn test_body_cycle_detected() {
        let outer = Body::new();
        let inner = Body::new();
        outer.push(inner.clone());
        inner.push(outer.clone());

        let err = Lexer::new().tokenize(&outer).unwrap_err();
        assert!(matches!(*err, Error::BodyCycle));
        inner.clear();
    }

    #[test]
    fn test_same_body_twice_is_not_a_cycle() {
        let shared = Body::new();
        shared.push("x");
        shared.push(Newline::Plain);
        let body = Body::new();
        body.push(shared.clone());
        body.push(shared.clone());

        let lexemes = Lexer::new().tokenize(&body).unwrap();
        assert_eq!(shape(&lexemes), ["x", "x"]);
    }
}
