use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for scribe operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("unclosed placeholder in template")]
    #[diagnostic(
        code(scribe::format::unclosed_placeholder),
        help("close the placeholder with '}}' or escape the brace as '{{{{'")
    )]
    UnclosedPlaceholder {
        #[source_code]
        src: NamedSource<String>,
        #[label("placeholder opened here")]
        span: SourceSpan,
    },

    #[error("single '}}' encountered in template")]
    #[diagnostic(
        code(scribe::format::unmatched_brace),
        help("escape a literal closing brace as '}}}}'")
    )]
    UnmatchedBrace {
        #[source_code]
        src: NamedSource<String>,
        #[label("unmatched brace")]
        span: SourceSpan,
    },

    #[error("template refers to positional argument {index} but only {given} were supplied")]
    #[diagnostic(code(scribe::format::missing_positional))]
    MissingPositional {
        #[source_code]
        src: NamedSource<String>,
        #[label("no argument for this placeholder")]
        span: SourceSpan,
        index: usize,
        given: usize,
    },

    #[error("template refers to named argument '{name}' which was not supplied")]
    #[diagnostic(
        code(scribe::format::missing_named),
        help("add it with `Format::set(\"{name}\", ...)` before rendering")
    )]
    MissingNamed {
        #[source_code]
        src: NamedSource<String>,
        #[label("no argument named '{name}'")]
        span: SourceSpan,
        name: String,
    },

    #[error("unindent at token {position} has no matching indent")]
    #[diagnostic(
        code(scribe::structure::unmatched_unindent),
        help("every unindent must close an indent opened by `scope()`")
    )]
    UnmatchedUnindent { position: usize },

    #[error("{depth} indent level(s) left open at the end of the body")]
    #[diagnostic(
        code(scribe::structure::unclosed_indent),
        help("a scope guard was probably leaked with `std::mem::forget`")
    )]
    UnclosedIndent { depth: usize },

    #[error("body contains itself")]
    #[diagnostic(
        code(scribe::structure::body_cycle),
        help("a submodule body was appended into one of its own descendants")
    )]
    BodyCycle,

    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse module options")]
    #[diagnostic(code(scribe::config))]
    Config {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Create a config error from a toml error with source context
    pub fn config(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Config {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    pub(crate) fn unclosed_placeholder(template: &str, at: usize) -> Box<Self> {
        Box::new(Error::UnclosedPlaceholder {
            src: template_source(template),
            span: (at, template.len() - at).into(),
        })
    }

    pub(crate) fn unmatched_brace(template: &str, at: usize) -> Box<Self> {
        Box::new(Error::UnmatchedBrace {
            src: template_source(template),
            span: (at, 1).into(),
        })
    }

    pub(crate) fn missing_positional(
        template: &str,
        span: impl Into<SourceSpan>,
        index: usize,
        given: usize,
    ) -> Box<Self> {
        Box::new(Error::MissingPositional {
            src: template_source(template),
            span: span.into(),
            index,
            given,
        })
    }

    pub(crate) fn missing_named(
        template: &str,
        span: impl Into<SourceSpan>,
        name: impl Into<String>,
    ) -> Box<Self> {
        Box::new(Error::MissingNamed {
            src: template_source(template),
            span: span.into(),
            name: name.into(),
        })
    }

    /// Whether this error reports unbalanced indentation.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::UnmatchedUnindent { .. } | Error::UnclosedIndent { .. } | Error::BodyCycle
        )
    }
}

fn template_source(template: &str) -> NamedSource<String> {
    NamedSource::new("template", template.to_string())
}
