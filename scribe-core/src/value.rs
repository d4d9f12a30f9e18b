//! Deferred-stringification primitives.
//!
//! Every primitive here is a cheap-to-clone handle over shared inputs. The
//! inputs may keep changing through any clone of the handle until the value
//! is rendered for the first time; from then on the rendered string is cached
//! and further mutation is ignored by that instance.
//!
//! # Example
//!
//! ```
//! use scribe_core::{ArgsAndKwargs, Format};
//!
//! let params = ArgsAndKwargs::empty();
//! let header = Format::new("def {}({}):").arg("sum").arg(params.clone());
//!
//! // Parameters discovered after the header was created are still picked up.
//! params.push("x");
//! params.insert("y", "0");
//!
//! assert_eq!(header.value().unwrap(), "def sum(x, y=0):");
//! ```

use std::{
    borrow::Cow,
    cell::{Cell, OnceCell, RefCell},
    fmt,
    rc::Rc,
};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A value whose string form is computed at render time.
pub trait Deferred: fmt::Debug {
    /// Produce the string form of this value.
    fn render(&self) -> Result<String>;
}

/// An atom of line content: either plain text or a deferred value.
#[derive(Debug, Clone)]
pub enum Piece {
    Text(String),
    Deferred(Rc<dyn Deferred>),
}

impl Piece {
    /// Wrap any [`Deferred`] implementation.
    pub fn deferred(value: impl Deferred + 'static) -> Self {
        Self::Deferred(Rc::new(value))
    }

    /// Render this piece, borrowing when it is plain text.
    pub fn render(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Text(text) => Ok(Cow::Borrowed(text)),
            Self::Deferred(value) => value.render().map(Cow::Owned),
        }
    }

    /// True for empty plain text. Deferred values always count as content.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Piece {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

/// Compute-once string cache.
#[derive(Debug, Default)]
struct Memo(OnceCell<String>);

impl Memo {
    fn get_or_render(&self, render: impl FnOnce() -> Result<String>) -> Result<String> {
        if let Some(value) = self.0.get() {
            return Ok(value.clone());
        }
        let value = render()?;
        Ok(self.0.get_or_init(|| value).clone())
    }

    fn is_rendered(&self) -> bool {
        self.0.get().is_some()
    }
}

fn collect_pieces<I>(items: I) -> Vec<Piece>
where
    I: IntoIterator,
    I::Item: Into<Piece>,
{
    items.into_iter().map(Into::into).collect()
}

// =========================================================================
// Format
// =========================================================================

/// A template rendered with `{}`, `{0}` and `{name}` placeholders.
///
/// `{{` and `}}` produce literal braces. No format-spec grammar (`{:>4}`)
/// is supported. Placeholder/argument mismatches surface on first render.
#[derive(Debug, Clone)]
pub struct Format(Rc<FormatInner>);

#[derive(Debug)]
struct FormatInner {
    template: String,
    positional: RefCell<Vec<Piece>>,
    named: RefCell<IndexMap<String, Piece>>,
    memo: Memo,
}

impl Format {
    pub fn new(template: impl Into<String>) -> Self {
        Self(Rc::new(FormatInner {
            template: template.into(),
            positional: RefCell::default(),
            named: RefCell::default(),
            memo: Memo::default(),
        }))
    }

    /// Add a positional argument.
    pub fn arg(self, value: impl Into<Piece>) -> Self {
        self.push(value);
        self
    }

    /// Add a named argument.
    pub fn named(self, name: impl Into<String>, value: impl Into<Piece>) -> Self {
        self.set(name, value);
        self
    }

    /// Append a positional argument through a shared handle.
    pub fn push(&self, value: impl Into<Piece>) {
        self.0.positional.borrow_mut().push(value.into());
    }

    /// Set (or replace) a named argument through a shared handle.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Piece>) {
        self.0.named.borrow_mut().insert(name.into(), value.into());
    }

    pub fn template(&self) -> &str {
        &self.0.template
    }

    /// The rendered string, computed on first call.
    pub fn value(&self) -> Result<String> {
        self.0.render()
    }

    pub fn is_rendered(&self) -> bool {
        self.0.memo.is_rendered()
    }
}

impl Deferred for FormatInner {
    fn render(&self) -> Result<String> {
        self.memo.get_or_render(|| {
            render_template(&self.template, &self.positional.borrow(), &self.named.borrow())
        })
    }
}

/// Substitute `{}`/`{N}`/`{name}` placeholders in `template`.
pub fn render_template(
    template: &str,
    positional: &[Piece],
    named: &IndexMap<String, Piece>,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut next_auto = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let Some(len) = template[at + 1..].find('}') else {
                    return Err(Error::unclosed_placeholder(template, at));
                };
                let close = at + 1 + len;
                let key = &template[at + 1..close];
                let span = (at, close + 1 - at);
                while chars.next_if(|&(i, _)| i <= close).is_some() {}

                let piece = if key.is_empty() {
                    let index = next_auto;
                    next_auto += 1;
                    positional.get(index).ok_or_else(|| {
                        Error::missing_positional(template, span, index, positional.len())
                    })?
                } else if key.bytes().all(|b| b.is_ascii_digit()) {
                    let index = key.parse::<usize>().unwrap_or(usize::MAX);
                    positional.get(index).ok_or_else(|| {
                        Error::missing_positional(template, span, index, positional.len())
                    })?
                } else {
                    named
                        .get(key)
                        .ok_or_else(|| Error::missing_named(template, span, key))?
                };
                out.push_str(&piece.render()?);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(Error::unmatched_brace(template, at)),
            c => out.push(c),
        }
    }

    Ok(out)
}

// =========================================================================
// Join
// =========================================================================

/// Items joined with a separator at render time.
#[derive(Debug, Clone)]
pub struct Join(Rc<JoinInner>);

#[derive(Debug)]
struct JoinInner {
    sep: String,
    items: RefCell<Vec<Piece>>,
    trim_empty: Cell<bool>,
    memo: Memo,
}

impl Join {
    pub fn new<I>(sep: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Piece>,
    {
        Self(Rc::new(JoinInner {
            sep: sep.into(),
            items: RefCell::new(collect_pieces(items)),
            trim_empty: Cell::new(false),
            memo: Memo::default(),
        }))
    }

    /// Drop items that render to the empty string before joining.
    pub fn trim_empty(self) -> Self {
        self.0.trim_empty.set(true);
        self
    }

    pub fn push(&self, item: impl Into<Piece>) {
        self.0.items.borrow_mut().push(item.into());
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self) -> Result<String> {
        self.0.render()
    }
}

impl Deferred for JoinInner {
    fn render(&self) -> Result<String> {
        self.memo.get_or_render(|| {
            let mut parts = Vec::new();
            for item in self.items.borrow().iter() {
                let part = item.render()?;
                if !(self.trim_empty.get() && part.is_empty()) {
                    parts.push(part.into_owned());
                }
            }
            Ok(parts.join(&self.sep))
        })
    }
}

// =========================================================================
// ArgumentList
// =========================================================================

/// Positional parameters rendered as `a, b: T, c`.
///
/// A type annotation is attached to an item whose rendered form matches a
/// key registered with [`ArgumentList::typed`].
#[derive(Debug, Clone)]
pub struct ArgumentList(Rc<ArgumentListInner>);

#[derive(Debug, Default)]
struct ArgumentListInner {
    items: RefCell<Vec<Piece>>,
    types: RefCell<IndexMap<String, Piece>>,
    memo: Memo,
}

impl ArgumentList {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Piece>,
    {
        Self(Rc::new(ArgumentListInner {
            items: RefCell::new(collect_pieces(items)),
            ..Default::default()
        }))
    }

    pub fn empty() -> Self {
        Self(Rc::default())
    }

    /// Annotate the argument `name` with `ty`.
    pub fn typed(self, name: impl Into<String>, ty: impl Into<Piece>) -> Self {
        self.set_type(name, ty);
        self
    }

    pub fn set_type(&self, name: impl Into<String>, ty: impl Into<Piece>) {
        self.0.types.borrow_mut().insert(name.into(), ty.into());
    }

    pub fn push(&self, item: impl Into<Piece>) {
        self.0.items.borrow_mut().push(item.into());
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self) -> Result<String> {
        self.0.render()
    }
}

impl Deferred for ArgumentListInner {
    fn render(&self) -> Result<String> {
        self.memo.get_or_render(|| {
            let types = self.types.borrow();
            let mut parts = Vec::new();
            for item in self.items.borrow().iter() {
                let name = item.render()?;
                match types.get(&*name) {
                    Some(ty) => parts.push(format!("{}: {}", name, ty.render()?)),
                    None => parts.push(name.into_owned()),
                }
            }
            Ok(parts.join(", "))
        })
    }
}

// =========================================================================
// KeywordList
// =========================================================================

/// Keyword parameters rendered as `k=v, k2: T = v2` in insertion order.
#[derive(Debug, Clone)]
pub struct KeywordList(Rc<KeywordListInner>);

#[derive(Debug, Default)]
struct KeywordListInner {
    pairs: RefCell<IndexMap<String, Piece>>,
    types: RefCell<IndexMap<String, Piece>>,
    memo: Memo,
}

impl KeywordList {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Piece>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Rc::new(KeywordListInner {
            pairs: RefCell::new(pairs),
            ..Default::default()
        }))
    }

    pub fn empty() -> Self {
        Self(Rc::default())
    }

    pub fn typed(self, name: impl Into<String>, ty: impl Into<Piece>) -> Self {
        self.set_type(name, ty);
        self
    }

    pub fn set_type(&self, name: impl Into<String>, ty: impl Into<Piece>) {
        self.0.types.borrow_mut().insert(name.into(), ty.into());
    }

    /// Insert a keyword; replacing an existing key keeps its position.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<Piece>) {
        self.0.pairs.borrow_mut().insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.pairs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self) -> Result<String> {
        self.0.render()
    }
}

impl Deferred for KeywordListInner {
    fn render(&self) -> Result<String> {
        self.memo.get_or_render(|| {
            let types = self.types.borrow();
            let mut parts = Vec::new();
            for (name, value) in self.pairs.borrow().iter() {
                let value = value.render()?;
                match types.get(name) {
                    Some(ty) => parts.push(format!("{}: {} = {}", name, ty.render()?, value)),
                    None => parts.push(format!("{}={}", name, value)),
                }
            }
            Ok(parts.join(", "))
        })
    }
}

// =========================================================================
// ArgsAndKwargs
// =========================================================================

/// Positional arguments, keywords and a trailing variadic group.
///
/// Each group is emitted only when it holds at least one entry.
#[derive(Debug, Clone)]
pub struct ArgsAndKwargs(Rc<ArgsAndKwargsInner>);

#[derive(Debug)]
struct ArgsAndKwargsInner {
    args: ArgumentList,
    kwargs: KeywordList,
    tail: ArgumentList,
    memo: Memo,
}

impl ArgsAndKwargs {
    pub fn new(args: ArgumentList, kwargs: KeywordList) -> Self {
        Self(Rc::new(ArgsAndKwargsInner {
            args,
            kwargs,
            tail: ArgumentList::empty(),
            memo: Memo::default(),
        }))
    }

    pub fn empty() -> Self {
        Self::new(ArgumentList::empty(), KeywordList::empty())
    }

    pub fn push(&self, arg: impl Into<Piece>) {
        self.0.args.push(arg);
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<Piece>) {
        self.0.kwargs.insert(name, value);
    }

    /// Append to the trailing group (e.g. `*args`, `**kwargs`).
    pub fn push_tail(&self, arg: impl Into<Piece>) {
        self.0.tail.push(arg);
    }

    pub fn args(&self) -> &ArgumentList {
        &self.0.args
    }

    pub fn kwargs(&self) -> &KeywordList {
        &self.0.kwargs
    }

    pub fn tail(&self) -> &ArgumentList {
        &self.0.tail
    }

    pub fn is_empty(&self) -> bool {
        self.0.args.is_empty() && self.0.kwargs.is_empty() && self.0.tail.is_empty()
    }

    pub fn value(&self) -> Result<String> {
        self.0.render()
    }
}

impl Deferred for ArgsAndKwargsInner {
    fn render(&self) -> Result<String> {
        self.memo.get_or_render(|| {
            let mut parts = Vec::new();
            if !self.args.is_empty() {
                parts.push(self.args.value()?);
            }
            if !self.kwargs.is_empty() {
                parts.push(self.kwargs.value()?);
            }
            if !self.tail.is_empty() {
                parts.push(self.tail.value()?);
            }
            Ok(parts.join(", "))
        })
    }
}

macro_rules! impl_piece_from_handle {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Piece {
                fn from(handle: $ty) -> Self {
                    Self::Deferred(handle.0)
                }
            }

            impl From<&$ty> for Piece {
                fn from(handle: &$ty) -> Self {
                    Self::Deferred(handle.0.clone())
                }
            }
        )*
    };
}

impl_piece_from_handle!(Format, Join, ArgumentList, KeywordList, ArgsAndKwargs);
