use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Stdout, Write};
use std::ops::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use crate::array_format::ArrayFormatOptions;
use crate::node::NodeIdentity;

/// Layout settings for a trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Added to the indentation for every level of producers.
    pub indent: String,
    /// Constant payloads with more elements than this are summarized.
    pub threshold: usize,
    pub edge_items: usize,
    pub line_width: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent: "|  ".to_string(),
            threshold: 20,
            edge_items: 3,
            line_width: 75,
        }
    }
}

impl PrintOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn array_format_options(&self, prefix: &str) -> ArrayFormatOptions {
        ArrayFormatOptions {
            threshold: self.threshold,
            edge_items: self.edge_items,
            line_width: self.line_width,
            prefix: prefix.to_string(),
        }
    }
}

/// An indentation increment: a number of spaces or a literal string.
#[derive(Clone, Debug, PartialEq)]
pub enum Indent<'a> {
    Spaces(usize),
    Literal(Cow<'a, str>),
}

impl From<usize> for Indent<'_> {
    fn from(value: usize) -> Self {
        Indent::Spaces(value)
    }
}

impl<'a> From<&'a str> for Indent<'a> {
    fn from(value: &'a str) -> Self {
        Indent::Literal(Cow::Borrowed(value))
    }
}

impl From<String> for Indent<'_> {
    fn from(value: String) -> Self {
        Indent::Literal(Cow::Owned(value))
    }
}

fn identity_formatter(text: &str) -> String {
    text.to_string()
}

/// Writes indented lines to a sink and remembers which subgraphs it has
/// already expanded.
///
/// The set of printed subgraphs lives as long as the printer. Passing the same
/// printer to several top-level calls therefore collapses nodes that an
/// earlier call already expanded; use [`Printer::reset_subgraphs`] between
/// calls to avoid that.
pub struct Printer<W: Write = Stdout> {
    buffer: W,
    formatter: fn(&str) -> String,
    indentation: String,
    depth: usize,
    printed_subgraphs: HashSet<NodeIdentity>,
    options: PrintOptions,
}

impl Printer<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl Default for Printer<Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write> Printer<W> {
    pub fn new(buffer: W) -> Self {
        Self {
            buffer,
            formatter: identity_formatter,
            indentation: String::new(),
            depth: 0,
            printed_subgraphs: HashSet::new(),
            options: PrintOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PrintOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the function applied to every piece of text before it is indented.
    pub fn with_formatter(mut self, formatter: fn(&str) -> String) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    pub fn indentation(&self) -> &str {
        &self.indentation
    }

    /// Number of indentation scopes currently open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Extends the indentation until the returned guard is dropped.
    pub fn indented<'a>(&mut self, indent: impl Into<Indent<'a>>) -> IndentGuard<'_, W> {
        let restore_len = self.indentation.len();
        match indent.into() {
            Indent::Spaces(n) => self.indentation.extend(std::iter::repeat_n(' ', n)),
            Indent::Literal(s) => self.indentation.push_str(&s),
        }
        self.depth += 1;
        IndentGuard { printer: self, restore_len }
    }

    pub fn format(&self, text: &str) -> String {
        format!("{}{}", self.indentation, (self.formatter)(text))
    }

    pub fn print(&mut self, text: &str) -> std::io::Result<()> {
        let line = self.format(text);
        self.buffer.write_all(line.as_bytes())?;
        self.buffer.flush()
    }

    pub fn println(&mut self, text: &str) -> std::io::Result<()> {
        let mut line = self.format(text);
        line.push('\n');
        self.buffer.write_all(line.as_bytes())?;
        self.buffer.flush()
    }

    pub fn has_printed(&self, identity: &NodeIdentity) -> bool {
        self.printed_subgraphs.contains(identity)
    }

    /// Returns `false` if the identity was already recorded.
    pub fn mark_printed(&mut self, identity: NodeIdentity) -> bool {
        self.printed_subgraphs.insert(identity)
    }

    pub fn printed_subgraphs(&self) -> &HashSet<NodeIdentity> {
        &self.printed_subgraphs
    }

    pub fn reset_subgraphs(&mut self) {
        self.printed_subgraphs.clear();
    }

    pub fn get_ref(&self) -> &W {
        &self.buffer
    }

    pub fn into_inner(self) -> W {
        self.buffer
    }
}

/// Restores the printer's indentation when dropped, including on early
/// returns and unwinding.
pub struct IndentGuard<'a, W: Write> {
    printer: &'a mut Printer<W>,
    restore_len: usize,
}

impl<W: Write> Deref for IndentGuard<'_, W> {
    type Target = Printer<W>;

    fn deref(&self) -> &Self::Target {
        self.printer
    }
}

impl<W: Write> DerefMut for IndentGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.printer
    }
}

impl<W: Write> Drop for IndentGuard<'_, W> {
    fn drop(&mut self) {
        self.printer.indentation.truncate(self.restore_len);
        self.printer.depth -= 1;
    }
}
