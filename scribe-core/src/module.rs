//! Builder facade over a [`Body`].

use std::rc::Rc;

use tracing::debug;

use crate::{
    body::Body,
    config::{Indent, ModuleOptions},
    emitter::Emitter,
    error::Result,
    lexer::Lexer,
    parser::Parser,
    token::{Newline, Token},
};

/// Lexer, parser and emitter shared by a module and its submodules.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub lexer: Lexer,
    pub parser: Parser,
    pub emitter: Emitter,
}

impl Pipeline {
    /// Render `body` against its current state.
    pub fn run(&self, body: &Body, options: &ModuleOptions) -> Result<String> {
        let lexemes = self.lexer.tokenize(body)?;
        let lexeme_count = lexemes.len();
        let root = self.parser.parse(lexemes)?;
        let text = self.emitter.emit(&root, options)?;
        debug!(
            lexemes = lexeme_count,
            depth = root.max_depth(),
            bytes = text.len(),
            "rendered module"
        );
        Ok(text)
    }
}

/// Fluent API for building indented text out of order.
///
/// A `Module` is a handle: clones share the same body, options and pipeline.
/// Rendering is never cached, so it always reflects the current body.
///
/// # Example
///
/// ```
/// use scribe_core::Module;
///
/// let m = Module::new();
/// let imports = m.submodule("import os");
/// m.stmt("def main():");
/// {
///     let _scope = m.scope();
///     m.stmt("print(sys.argv)");
/// }
/// imports.stmt("import sys");
///
/// assert_eq!(
///     m.render().unwrap(),
///     "import os\nimport sys\ndef main():\n    print(sys.argv)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Module {
    body: Body,
    options: Rc<ModuleOptions>,
    pipeline: Rc<Pipeline>,
}

impl Module {
    /// Create a new Module with default options (4-space indentation).
    pub fn new() -> Self {
        Self::with_options(ModuleOptions::default())
    }

    pub fn with_options(options: ModuleOptions) -> Self {
        Self::with_pipeline(options, Rc::default())
    }

    /// Create a Module that renders through an existing pipeline.
    pub fn with_pipeline(options: ModuleOptions, pipeline: Rc<Pipeline>) -> Self {
        Self {
            body: Body::new(),
            options: Rc::new(options),
            pipeline,
        }
    }

    /// Create a new Module with 2-space indentation (JS/TS default).
    pub fn typescript() -> Self {
        Self::with_options(ModuleOptions::new().with_indent(Indent::TYPESCRIPT))
    }

    /// Create a new Module with tab indentation (Go default).
    pub fn go() -> Self {
        Self::with_options(ModuleOptions::new().with_indent(Indent::GO))
    }

    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn pipeline(&self) -> &Rc<Pipeline> {
        &self.pipeline
    }

    /// Whether both handles build into the same body.
    pub fn same_body(&self, other: &Module) -> bool {
        self.body.ptr_eq(&other.body)
    }

    /// A fresh module sharing this module's options and pipeline.
    fn sibling(&self) -> Self {
        Self {
            body: Body::new(),
            options: Rc::clone(&self.options),
            pipeline: Rc::clone(&self.pipeline),
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Append a line.
    ///
    /// The returned handle owns just that line, so later
    /// [`insert_after`](Self::insert_after) calls on it extend this line no
    /// matter what was appended to `self` since.
    pub fn stmt(&self, value: impl Into<Token>) -> Module {
        let line = self.sibling();
        line.body.push(value);
        line.body.push(Token::NEWLINE);
        self.body.push(Token::Line(line.body.clone()));
        line
    }

    /// Append a token without terminating the line.
    pub fn append(&self, token: impl Into<Token>) {
        self.body.push(token);
    }

    /// Append a bare newline, producing a blank line.
    pub fn sep(&self) {
        self.body.push(Newline::Plain);
    }

    /// Indent everything appended until the guard is dropped.
    ///
    /// The unindent is appended on every exit path, including early returns
    /// through `?` and unwinding panics.
    pub fn scope(&self) -> ScopeGuard<'_> {
        self.body.push(Token::Indent);
        ScopeGuard {
            module: self,
            trailer: None,
        }
    }

    /// Like [`scope`](Self::scope), appending `trailer` after the unindent.
    pub fn scope_with_trailer(&self, trailer: impl Into<Token>) -> ScopeGuard<'_> {
        let mut guard = self.scope();
        guard.trailer = Some(trailer.into());
        guard
    }

    /// Run `f` inside an indented scope and return its result.
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_core::Module;
    ///
    /// let m = Module::go();
    /// m.stmt("func main() {");
    /// m.scoped(|m| m.stmt("fmt.Println(\"hi\")"));
    /// m.stmt("}");
    /// assert_eq!(m.render().unwrap(), "func main() {\n\tfmt.Println(\"hi\")\n}");
    /// ```
    pub fn scoped<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        let _scope = self.scope();
        f(self)
    }

    /// Reserve the current position for content added later.
    ///
    /// The new module's body is embedded here by reference; anything
    /// appended through the returned handle shows up at this position. A
    /// non-empty `initial` value becomes its first line.
    pub fn submodule(&self, initial: impl Into<Token>) -> Module {
        let initial = initial.into();
        let sub = self.sibling();
        if !initial.is_blank() {
            sub.stmt(initial);
        }
        self.body.push(sub.body.clone());
        sub
    }

    /// Like [`submodule`](Self::submodule) but `initial` is appended without
    /// a trailing newline.
    pub fn submodule_inline(&self, initial: impl Into<Token>) -> Module {
        let sub = self.sibling();
        sub.body.push(initial);
        self.body.push(sub.body.clone());
        sub
    }

    /// Prepend to this handle's own body.
    pub fn insert_before(&self, value: impl Into<Token>) {
        self.body.insert_before(value);
    }

    /// Extend the last line of this handle's own body.
    pub fn insert_after(&self, value: impl Into<Token>) {
        self.body.insert_after(value);
    }

    /// Remove one trailing newline so the next append joins the last line.
    pub fn unnewline(&self) -> bool {
        self.body.unnewline()
    }

    pub fn clear(&self) {
        self.body.clear();
    }

    /// Run the full lexer, parser and emitter pipeline on the current body.
    pub fn render(&self) -> Result<String> {
        self.pipeline.run(&self.body, &self.options)
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes an indentation level when dropped.
#[derive(Debug)]
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    module: &'a Module,
    trailer: Option<Token>,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.module.body.push(Token::Unindent);
        if let Some(trailer) = self.trailer.take() {
            self.module.body.push(trailer);
        }
    }
}
