//! Writes a frame tree out as text.

use crate::{
    config::ModuleOptions,
    error::Result,
    parser::{Frame, FrameItem},
    token::Newline,
};

/// Depth-first writer for [`Frame`] trees.
///
/// Each sentence is written as `indent × depth`, its content and the
/// newline string; blank sentences get no indentation and are always kept.
/// At depth 0 a [`Newline::Separator`] adds one extra blank line unless the
/// output already ends with two. A child frame that directly follows another
/// child frame at depth 0 is preceded by one blank line; a frame that follows
/// a sentence is not. Trailing whitespace of the whole output is trimmed.
#[derive(Debug, Clone, Default)]
pub struct Emitter;

/// Blank lines a top-level separator pads up to.
const SEPARATOR_BLANK_LINES: usize = 2;

struct Writer<'a> {
    out: String,
    indent: &'a str,
    newline: &'a str,
    /// Consecutive blank lines at the end of `out`.
    blank_run: usize,
}

impl Writer<'_> {
    fn line(&mut self, depth: usize, content: &str) {
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
        self.out.push_str(content);
        self.out.push_str(self.newline);
        self.blank_run = 0;
    }

    fn blank(&mut self) {
        self.out.push_str(self.newline);
        self.blank_run += 1;
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, root: &Frame, options: &ModuleOptions) -> Result<String> {
        let indent = options.indent.as_str();
        let mut writer = Writer {
            out: String::new(),
            indent: &indent,
            newline: &options.newline,
            blank_run: 0,
        };

        self.emit_frame(&mut writer, root)?;
        let mut out = writer.out;
        out.truncate(out.trim_end().len());
        Ok(out)
    }

    fn emit_frame(&self, writer: &mut Writer<'_>, frame: &Frame) -> Result<()> {
        let top_level = frame.depth() == 0;
        let mut after_frame = false;

        for item in frame.items() {
            match item {
                FrameItem::Sentence(sentence) => {
                    let line = sentence.render()?;
                    if line.is_empty() {
                        writer.blank();
                    } else {
                        writer.line(frame.depth(), &line);
                    }
                    if top_level
                        && sentence.newline() == Some(Newline::Separator)
                        && writer.blank_run < SEPARATOR_BLANK_LINES
                    {
                        writer.blank();
                    }
                    after_frame = false;
                }
                FrameItem::Frame(child) => {
                    if top_level && after_frame {
                        writer.blank();
                    }
                    self.emit_frame(writer, child)?;
                    after_frame = true;
                }
            }
        }
        Ok(())
    }
}
