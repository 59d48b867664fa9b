//! Styled text fragments used by the report text blocks.
//!
//! A [`Span`] carries the inline styling the PDF renderer understands (bold, italic and colour).
//! Report texts that mix styles, such as the description line of the metadata block, are written
//! in a small markup and parsed with [`parse_markup`].

use std::fmt;

use genpdf::style::{Color, Style, StyledString};

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Marks the span as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the span as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Assigns a color to the span.
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Fills in the color when the span does not carry its own.
    pub fn or_colored(mut self, color: Option<Color>) -> Self {
        if self.color.is_none() {
            self.color = color;
        }
        self
    }

    /// Returns a span with the same styling and different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    fn style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`] for the PDF renderer.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.style())
    }
}

/// Joins the text of `spans` without styling.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

/// Parse errors produced by [`parse_markup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    index: usize,
    message: String,
}

impl ParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Byte index in the original input string where the error was detected.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.index)
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Color(Color),
}

impl Marker {
    fn describe(self) -> &'static str {
        match self {
            Marker::Bold => "bold span",
            Marker::Italic => "italic span",
            Marker::Color(_) => "color span",
        }
    }
}

struct MarkupParser<'a> {
    input: &'a str,
    spans: Vec<Span>,
    buffer: String,
    stack: Vec<(Marker, usize)>,
}

impl<'a> MarkupParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            spans: Vec::new(),
            buffer: String::new(),
            stack: Vec::new(),
        }
    }

    fn current_span(&self, text: String) -> Span {
        let mut span = Span::new(text);
        for (marker, _) in &self.stack {
            match marker {
                Marker::Bold => span.bold = true,
                Marker::Italic => span.italic = true,
                Marker::Color(color) => span.color = Some(*color),
            }
        }
        span
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            let span = self.current_span(text);
            self.spans.push(span);
        }
    }

    fn open(&mut self, marker: Marker, index: usize) {
        self.flush();
        self.stack.push((marker, index));
    }

    fn close(&mut self) {
        self.flush();
        self.stack.pop();
    }

    fn closing_len(&self, rest: &str) -> Option<usize> {
        match self.stack.last() {
            Some((Marker::Bold, _)) if rest.starts_with("**") => Some(2),
            Some((Marker::Italic, _)) if rest.starts_with('*') => Some(1),
            _ => None,
        }
    }

    fn run(mut self) -> Result<Vec<Span>, ParseError> {
        let mut index = 0;
        while index < self.input.len() {
            let rest = &self.input[index..];
            if let Some(len) = self.closing_len(rest) {
                self.close();
                index += len;
            } else if rest.starts_with("**") {
                self.open(Marker::Bold, index);
                index += 2;
            } else if rest.starts_with('*') {
                self.open(Marker::Italic, index);
                index += 1;
            } else if rest.starts_with("[color=") {
                let (color, next) = parse_color_directive(self.input, index)?;
                self.open(Marker::Color(color), index);
                index = next;
            } else if rest.starts_with('}') {
                match self.stack.last() {
                    Some((Marker::Color(_), _)) => self.close(),
                    Some((marker, _)) => {
                        return Err(ParseError::new(
                            index,
                            format!("`}}` closes a color span inside an open {}", marker.describe()),
                        ))
                    }
                    None => {
                        return Err(ParseError::new(
                            index,
                            "unexpected closing token `}` without matching opening `[color=...]`",
                        ))
                    }
                }
                index += 1;
            } else if rest.starts_with('[') || rest.starts_with(']') {
                return Err(ParseError::new(
                    index,
                    "unsupported directive; expected `[color=#RRGGBB]{...}`",
                ));
            } else if let Some(ch) = rest.chars().next() {
                self.buffer.push(ch);
                index += ch.len_utf8();
            }
        }

        if let Some((marker, start)) = self.stack.last() {
            return Err(ParseError::new(
                *start,
                format!("unterminated {}", marker.describe()),
            ));
        }
        self.flush();
        Ok(self.spans)
    }
}

/// Parses a small markdown-inspired syntax into a list of [`Span`]s.
///
/// Supported constructs: `**bold**`, `*italic*` and `[color=#RRGGBB]{text}`. Markers nest but
/// must close in reverse order of opening.
pub fn parse_markup(input: &str) -> Result<Vec<Span>, ParseError> {
    MarkupParser::new(input).run()
}

fn parse_color_directive(input: &str, index: usize) -> Result<(Color, usize), ParseError> {
    const PREFIX: &str = "[color=#";
    let hex_start = index + PREFIX.len();
    if !input[index..].starts_with(PREFIX) {
        return Err(ParseError::new(
            index + PREFIX.len() - 1,
            "expected `#` followed by a hexadecimal RGB value",
        ));
    }

    let hex = input
        .get(hex_start..hex_start + 6)
        .ok_or_else(|| ParseError::new(hex_start, "incomplete color; expected 6 hex digits"))?;
    let channel = |offset: usize| {
        u8::from_str_radix(&hex[offset..offset + 2], 16)
            .map_err(|_| ParseError::new(hex_start, "invalid RGB specification; use hex digits"))
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::new(
            hex_start,
            "invalid RGB specification; use hex digits",
        ));
    }
    let color = Color::Rgb(channel(0)?, channel(2)?, channel(4)?);

    let after_hex = hex_start + 6;
    if !input[after_hex..].starts_with("]{") {
        return Err(ParseError::new(
            after_hex,
            "expected `]{` after the color value",
        ));
    }
    Ok((color, after_hex + 2))
}
