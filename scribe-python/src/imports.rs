//! `from X import ...` statements that keep accumulating names.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use indexmap::IndexMap;
use scribe_core::{Expand, ExpandContext, Result, Token};
use tracing::trace;

/// A `from <module> import ...` statement whose names are collected lazily.
///
/// The statement is expanded when the owning module is rendered, so names
/// added through any clone of this handle up to that point are included.
/// Names are deduplicated by the local name they bind (`a as b` binds `b`)
/// and kept in insertion order.
///
/// # Example
///
/// ```
/// use scribe_python::PythonModule;
///
/// let m = PythonModule::new();
/// let typing = m.from_("typing", ["Any"]);
/// m.stmt("x: Any = None");
/// typing.add("Optional");
/// typing.add("Any");
///
/// assert_eq!(
///     m.render().unwrap(),
///     "from typing import (\n    Any,\n    Optional,\n)\nx: Any = None"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FromImport(Rc<FromImportInner>);

#[derive(Debug)]
struct FromImportInner {
    module: String,
    /// Local name -> imported spec
    names: RefCell<IndexMap<String, String>>,
    sorted: Cell<bool>,
}

impl FromImport {
    pub fn new<I>(module: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let import = Self(Rc::new(FromImportInner {
            module: module.into(),
            names: RefCell::default(),
            sorted: Cell::new(false),
        }));
        import.extend(names);
        import
    }

    /// Render the multi-line form with names sorted instead of in insertion
    /// order.
    pub fn sorted(self) -> Self {
        self.0.sorted.set(true);
        self
    }

    pub fn is_sorted(&self) -> bool {
        self.0.sorted.get()
    }

    /// Add a name; a name binding an already imported local name is ignored.
    pub fn add(&self, name: impl Into<String>) {
        let name = name.into();
        let local = local_name(&name).to_string();
        self.0.names.borrow_mut().entry(local).or_insert(name);
    }

    pub fn extend<I>(&self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for name in names {
            self.add(name);
        }
    }

    pub fn module(&self) -> &str {
        &self.0.module
    }

    /// Check if a local name is already imported.
    pub fn has_name(&self, local: &str) -> bool {
        self.0.names.borrow().contains_key(local)
    }

    /// Imported specs in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.0.names.borrow().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.names.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The token that expands into this statement at render time.
    pub fn token(&self) -> Token {
        Token::Expandable(self.0.clone())
    }
}

fn local_name(spec: &str) -> &str {
    spec.rsplit_once(" as ")
        .map_or(spec, |(_, alias)| alias)
        .trim()
}

impl Expand for FromImportInner {
    fn expand(&self, cx: &ExpandContext<'_>) -> Result<Vec<Token>> {
        let names = self.names.borrow();
        let mut tokens = Vec::new();
        if names.is_empty() {
            return Ok(tokens);
        }
        if !cx.at_line_start() {
            tokens.push(Token::NEWLINE);
        }

        if let (1, Some(name)) = (names.len(), names.values().next()) {
            tokens.push(format!("from {} import {}", self.module, name).into());
            tokens.push(Token::NEWLINE);
        } else {
            tokens.push(format!("from {} import (", self.module).into());
            tokens.push(Token::NEWLINE);
            tokens.push(Token::Indent);
            let mut specs: Vec<&String> = names.values().collect();
            if self.sorted.get() {
                specs.sort();
            }
            for name in specs {
                tokens.push(format!("{},", name).into());
                tokens.push(Token::NEWLINE);
            }
            tokens.push(Token::Unindent);
            tokens.push(")".into());
            tokens.push(Token::NEWLINE);
        }

        trace!(module = %self.module, names = names.len(), "expanded from-import");
        Ok(tokens)
    }
}
