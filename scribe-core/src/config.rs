//! Rendering options shared by a module and all of its submodules.

use std::{borrow::Cow, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Indentation unit written once per nesting level.
///
/// In TOML either form is accepted: `indent = 2` (spaces) or
/// `indent = "\t"` (literal unit).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Indent {
    /// Spaces with the specified width (e.g., 2 or 4).
    Spaces(u8),
    /// An arbitrary unit string, such as a tab.
    Text(Cow<'static, str>),
}

impl Indent {
    /// 4-space indentation (Rust).
    pub const RUST: Self = Self::Spaces(4);

    /// 4-space indentation (Python, PEP 8).
    pub const PYTHON: Self = Self::Spaces(4);

    /// 2-space indentation (TypeScript, JavaScript, YAML).
    pub const TYPESCRIPT: Self = Self::Spaces(2);

    /// Tab indentation (Go).
    pub const GO: Self = Self::Text(Cow::Borrowed("\t"));

    /// Use `unit` verbatim for each level.
    pub fn text(unit: impl Into<Cow<'static, str>>) -> Self {
        Self::Text(unit.into())
    }

    /// The string written for one indent level.
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Self::Spaces(n) => Cow::Owned(" ".repeat(usize::from(*n))),
            Self::Text(unit) => Cow::Borrowed(unit),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::RUST
    }
}

impl From<&'static str> for Indent {
    fn from(unit: &'static str) -> Self {
        Self::Text(Cow::Borrowed(unit))
    }
}

impl From<String> for Indent {
    fn from(unit: String) -> Self {
        Self::Text(Cow::Owned(unit))
    }
}

/// Options recognised when constructing a [`Module`](crate::Module).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleOptions {
    pub indent: Indent,
    pub newline: String,
    /// Column threshold used by call-wrapping helpers.
    pub width: usize,
}

impl ModuleOptions {
    pub const DEFAULT_WIDTH: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: impl Into<Indent>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Parse options from a TOML document.
    ///
    /// Missing keys fall back to their defaults; unknown keys are rejected.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        Self::parse(src, "options.toml")
    }

    /// Read and parse options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::parse(&src, &path.display().to_string())
    }

    fn parse(src: &str, filename: &str) -> Result<Self> {
        toml::from_str(src).map_err(|e| Error::config(e, src, filename))
    }
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            newline: "\n".to_string(),
            width: Self::DEFAULT_WIDTH,
        }
    }
}
