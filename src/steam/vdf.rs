//! Hand-rolled VDF (Valve `KeyValues`) parser that keeps byte spans.
//!
//! Steam stores library folders and per-account settings in this format.
//! Every node records where its value sits in the original text so a single
//! value can be replaced (or one key inserted) without re-serializing the
//! file: everything Steam wrote that we do not touch stays byte-identical.

use std::ops::Range;

use crate::error::VdfError;

/// A VDF value: either a string or a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VdfValue {
    /// Quoted string (escapes decoded).
    String(String),
    /// Nested `{ ... }` block, children in file order.
    Object(Vec<VdfNode>),
}

/// A key with its value and the value's location in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdfNode {
    /// Key (escapes decoded).
    pub key: String,
    /// Value.
    pub value: VdfValue,
    /// Byte range of the value token: the quoted string including its
    /// quotes, or a block from `{` through `}`.
    pub value_span: Range<usize>,
}

impl VdfValue {
    /// Get as string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    /// Get children of a block.
    #[must_use]
    pub fn as_object(&self) -> Option<&[VdfNode]> {
        match self {
            Self::String(_) => None,
            Self::Object(children) => Some(children),
        }
    }

    /// Get a child node by key.  Steam is inconsistent about key casing
    /// (`apps` vs `Apps`), so the match ignores ASCII case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&VdfNode> {
        find(self.as_object()?, key)
    }

    /// Get a child string by key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.value.as_str()
    }
}

fn find<'a>(nodes: &'a [VdfNode], key: &str) -> Option<&'a VdfNode> {
    nodes.iter().find(|n| n.key.eq_ignore_ascii_case(key))
}

/// A parsed VDF file together with its original text.
#[derive(Debug, Clone)]
pub struct VdfDocument {
    text: String,
    root: Vec<VdfNode>,
}

impl VdfDocument {
    /// Parse VDF text.
    ///
    /// # Errors
    ///
    /// Returns a [`VdfError`] locating the first malformed token.
    pub fn parse(text: impl Into<String>) -> Result<Self, VdfError> {
        let text = text.into();
        let root = Parser::new(&text).parse_nodes(false)?;
        Ok(Self { text, root })
    }

    /// The original text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Top-level nodes.
    #[must_use]
    pub fn root(&self) -> &[VdfNode] {
        &self.root
    }

    /// Follow a key path from the top level (case-insensitive per segment).
    #[must_use]
    pub fn lookup(&self, path: &[&str]) -> Option<&VdfNode> {
        let (first, rest) = path.split_first()?;
        let mut node = find(&self.root, first)?;
        for key in rest {
            node = node.value.get(key)?;
        }
        Some(node)
    }

    /// Return the document text with `key` set to `value` inside the block at
    /// `block_path`.
    ///
    /// An existing string value is replaced in place; a missing key is
    /// inserted as a new line just before the block's closing brace, indented
    /// one level deeper than the brace.  Returns `None` if the block does not
    /// exist or `key` already holds a nested block.
    #[must_use]
    pub fn with_string(&self, block_path: &[&str], key: &str, value: &str) -> Option<String> {
        let block = self.lookup(block_path)?;
        let children = block.value.as_object()?;
        let quoted = quote(value);

        if let Some(existing) = find(children, key) {
            existing.value.as_str()?;
            return self.splice(existing.value_span.clone(), &quoted);
        }

        let close = block.value_span.end.checked_sub(1)?;
        let line_start = self.text.get(..close)?.rfind('\n').map(|i| i + 1);
        match line_start {
            Some(start)
                if self
                    .text
                    .get(start..close)?
                    .chars()
                    .all(|c| c == ' ' || c == '\t') =>
            {
                let indent = self.text.get(start..close)?;
                let line = format!("{indent}\t{}\t\t{quoted}\n", quote(key));
                self.splice(start..start, &line)
            }
            _ => {
                let inline = format!("\t{}\t\t{quoted}\t", quote(key));
                self.splice(close..close, &inline)
            }
        }
    }

    fn splice(&self, range: Range<usize>, replacement: &str) -> Option<String> {
        let head = self.text.get(..range.start)?;
        let tail = self.text.get(range.end..)?;
        let mut out = String::with_capacity(head.len() + replacement.len() + tail.len());
        out.push_str(head);
        out.push_str(replacement);
        out.push_str(tail);
        Some(out)
    }
}

/// Quote and escape a string for VDF output.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos..)?.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace and `//` comments.
    fn skip_trivia(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            if self
                .src
                .get(self.pos..)
                .is_some_and(|rest| rest.starts_with("//"))
            {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    /// Parse nodes until end of input (top level) or a closing brace
    /// (`nested`), consuming the brace.
    fn parse_nodes(&mut self, nested: bool) -> Result<Vec<VdfNode>, VdfError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None if nested => return Err(VdfError::UnexpectedEof { offset: self.pos }),
                None => return Ok(nodes),
                Some('}') if nested => {
                    self.bump();
                    return Ok(nodes);
                }
                Some('"') => nodes.push(self.parse_node()?),
                Some(found) => {
                    return Err(VdfError::UnexpectedToken {
                        offset: self.pos,
                        found,
                    });
                }
            }
        }
    }

    fn parse_node(&mut self) -> Result<VdfNode, VdfError> {
        let key = self.parse_string()?;
        self.skip_trivia();
        let start = self.pos;
        let value = match self.peek() {
            Some('"') => VdfValue::String(self.parse_string()?),
            Some('{') => {
                self.bump();
                VdfValue::Object(self.parse_nodes(true)?)
            }
            Some(found) => {
                return Err(VdfError::UnexpectedToken {
                    offset: self.pos,
                    found,
                });
            }
            None => return Err(VdfError::UnexpectedEof { offset: self.pos }),
        };
        let value_span = start..self.pos;
        self.skip_conditional();
        Ok(VdfNode {
            key,
            value,
            value_span,
        })
    }

    /// Skip a platform conditional such as `[$WIN32]` trailing a value.
    fn skip_conditional(&mut self) {
        let save = self.pos;
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.bump();
        }
        if self.peek() == Some('[') {
            while let Some(c) = self.bump() {
                if c == ']' {
                    return;
                }
            }
        }
        self.pos = save;
    }

    /// Parse a quoted string "...", decoding `\n`, `\t`, `\\`, and `\"`.
    fn parse_string(&mut self) -> Result<String, VdfError> {
        let start = self.pos;
        if self.bump() != Some('"') {
            return Err(VdfError::UnterminatedString { offset: start });
        }

        let mut result = String::new();
        loop {
            match self.bump() {
                None => return Err(VdfError::UnterminatedString { offset: start }),
                Some('"') => return Ok(result),
                Some('\\') => match self.bump() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(c) => {
                        result.push('\\');
                        result.push(c);
                    }
                    None => return Err(VdfError::UnterminatedString { offset: start }),
                },
                Some(c) => result.push(c),
            }
        }
    }
}
