//! Shared, growable token storage.

use std::{cell::RefCell, rc::Rc};

use crate::token::Token;

/// An ordered sequence of tokens behind a shared handle.
///
/// Cloning a `Body` yields another handle to the same storage: a body
/// appended into a parent by reference keeps reflecting every later push
/// made through any other handle.
#[derive(Debug, Clone, Default)]
pub struct Body(Rc<RefCell<Vec<Token>>>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, token: impl Into<Token>) {
        self.0.borrow_mut().push(token.into());
    }

    /// Prepend a token.
    pub fn insert_before(&self, token: impl Into<Token>) {
        self.0.borrow_mut().insert(0, token.into());
    }

    /// Append onto the last line.
    ///
    /// When the body ends with a newline the token is placed right before
    /// it. A trailing [`Token::Line`] is descended into, so a handle whose
    /// last entry is a statement extends that statement. Any other nested
    /// body is left alone.
    pub fn insert_after(&self, token: impl Into<Token>) {
        let token = token.into();
        let mut tokens = self.0.borrow_mut();
        match tokens.last() {
            Some(Token::Newline(_)) => {
                let at = tokens.len() - 1;
                tokens.insert(at, token);
            }
            Some(Token::Line(inner)) if !inner.ptr_eq(self) => {
                let inner = inner.clone();
                drop(tokens);
                inner.insert_after(token);
            }
            _ => tokens.push(token),
        }
    }

    /// Remove one trailing newline, looking through a trailing statement line.
    ///
    /// Returns whether a newline was removed.
    pub fn unnewline(&self) -> bool {
        let mut tokens = self.0.borrow_mut();
        match tokens.last() {
            Some(Token::Newline(_)) => {
                tokens.pop();
                true
            }
            Some(Token::Line(inner)) if !inner.ptr_eq(self) => {
                let inner = inner.clone();
                drop(tokens);
                inner.unnewline()
            }
            _ => false,
        }
    }

    pub fn tail(&self) -> Option<Token> {
        self.0.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// A snapshot of the current tokens.
    pub fn tokens(&self) -> Vec<Token> {
        self.0.borrow().clone()
    }

    /// Whether both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Body) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Newline;

    fn literals(body: &Body) -> Vec<String> {
        body.tokens()
            .into_iter()
            .map(|t| match t {
                Token::Literal(s) => s,
                Token::Newline(_) => "\\n".to_string(),
                Token::Body(_) => "<body>".to_string(),
                Token::Line(_) => "<line>".to_string(),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_clone_shares_storage() {
        let body = Body::new();
        let alias = body.clone();
        alias.push("x");
        assert_eq!(body.len(), 1);
        assert!(body.ptr_eq(&alias));
        assert!(!body.ptr_eq(&Body::new()));
    }

    #[test]
    fn test_insert_after_before_newline() {
        let body = Body::new();
        body.push("foo");
        body.push(Newline::Plain);
        body.insert_after("@");
        assert_eq!(literals(&body), ["foo", "@", "\\n"]);
    }

    #[test]
    fn test_insert_after_without_newline() {
        let body = Body::new();
        body.push("foo");
        body.insert_after("@");
        assert_eq!(literals(&body), ["foo", "@"]);
    }

    #[test]
    fn test_insert_after_descends_into_nested_line() {
        let line = Body::new();
        line.push("foo");
        line.push(Newline::Plain);
        let body = Body::new();
        body.push(Token::Line(line.clone()));

        body.insert_after("@");
        assert_eq!(literals(&line), ["foo", "@", "\\n"]);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_nested_body_is_opaque() {
        let reserved = Body::new();
        reserved.push("import a");
        reserved.push(Newline::Plain);
        let body = Body::new();
        body.push(reserved.clone());

        body.insert_after("# tail");
        assert!(!body.unnewline());
        assert_eq!(literals(&reserved), ["import a", "\\n"]);
        assert_eq!(literals(&body), ["<body>", "# tail"]);
    }

    #[test]
    fn test_insert_before() {
        let body = Body::new();
        body.push("foo");
        body.insert_before("@");
        assert_eq!(literals(&body), ["@", "foo"]);
    }

    #[test]
    fn test_unnewline() {
        let body = Body::new();
        assert!(!body.unnewline());

        let line = Body::new();
        line.push("}");
        line.push(Newline::Plain);
        body.push(Token::Line(line.clone()));

        assert!(body.unnewline());
        assert_eq!(literals(&line), ["}"]);
        assert!(!body.unnewline());
    }
}
