use std::fmt::Write as _;
use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ionzst_types::{Element, IonType, Symbol, Value};

use crate::config::TextStyle;
use crate::error::DriverError;

const INDENT: &str = "  ";

/// Writes [`Element`]s as Ion text, one top-level value at a time.
///
/// Every top-level value is followed by a newline. Each value is formatted
/// in full before it is written, so a sink error never leaves half a value
/// behind from this writer's side.
///
/// ```text
/// Element ──format──▶ String ──write_all──▶ sink
///                                  │
///                          finish() flushes
/// ```
pub struct TextWriter<W> {
    out: W,
    style: TextStyle,
    values: u64,
    buf: String,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W, style: TextStyle) -> Self {
        Self {
            out,
            style,
            values: 0,
            buf: String::new(),
        }
    }

    /// Write one top-level value followed by a newline.
    ///
    /// # Errors
    ///
    /// [`DriverError::Output`] if the sink fails.
    pub fn write_element(&mut self, element: &Element) -> Result<(), DriverError> {
        self.buf.clear();
        format_element(element, self.style, 0, &mut self.buf);
        self.buf.push('\n');
        self.out
            .write_all(self.buf.as_bytes())
            .map_err(DriverError::Output)?;
        self.values += 1;
        Ok(())
    }

    /// Values written so far.
    pub fn values_written(&self) -> u64 {
        self.values
    }

    /// Flush the sink and hand it back.
    ///
    /// # Errors
    ///
    /// [`DriverError::Output`] if flushing fails.
    pub fn finish(mut self) -> Result<W, DriverError> {
        self.out.flush().map_err(DriverError::Output)?;
        Ok(self.out)
    }
}

/// Format a single value as Ion text, without a trailing newline.
pub fn to_text(element: &Element, style: TextStyle) -> String {
    let mut out = String::new();
    format_element(element, style, 0, &mut out);
    out
}

fn format_element(element: &Element, style: TextStyle, depth: usize, out: &mut String) {
    for annotation in &element.annotations {
        write_symbol(annotation, out);
        out.push_str("::");
    }
    match &element.value {
        Value::Null(ion_type) => {
            out.push_str("null");
            if *ion_type != IonType::Null {
                out.push('.');
                out.push_str(ion_type.name());
            }
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(int) => {
            let _ = write!(out, "{int}");
        }
        Value::Float(f) => write_float(*f, out),
        Value::Decimal(decimal) => {
            let _ = write!(out, "{decimal}");
        }
        Value::Timestamp(ts) => {
            let _ = write!(out, "{ts}");
        }
        Value::Symbol(symbol) => write_symbol(symbol, out),
        Value::String(text) => write_quoted(text, '"', out),
        Value::Clob(bytes) => write_clob(bytes, out),
        Value::Blob(bytes) => {
            out.push_str("{{");
            out.push_str(&STANDARD.encode(bytes));
            out.push_str("}}");
        }
        Value::List(items) => {
            write_sequence(items.iter(), ('[', ']'), ",", style, depth, out, |item, out| {
                format_element(item, style, depth + 1, out);
            });
        }
        Value::SExp(items) => {
            write_sequence(items.iter(), ('(', ')'), "", style, depth, out, |item, out| {
                format_element(item, style, depth + 1, out);
            });
        }
        Value::Struct(fields) => {
            write_sequence(fields.iter(), ('{', '}'), ",", style, depth, out, |(name, value), out| {
                write_symbol(name, out);
                out.push_str(": ");
                format_element(value, style, depth + 1, out);
            });
        }
    }
}

/// Shared layout for lists, s-expressions and structs. Items are separated
/// by `separator` plus a space on one line, or `separator` plus a newline
/// when pretty-printing.
fn write_sequence<I, T, F>(
    items: I,
    (open, close): (char, char),
    separator: &str,
    style: TextStyle,
    depth: usize,
    out: &mut String,
    mut write_item: F,
) where
    I: ExactSizeIterator<Item = T>,
    F: FnMut(T, &mut String),
{
    out.push(open);
    if items.len() == 0 {
        out.push(close);
        return;
    }
    let pretty = style == TextStyle::Pretty;
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(separator);
            if !pretty {
                out.push(' ');
            }
        }
        if pretty {
            out.push('\n');
            push_indent(depth + 1, out);
        }
        write_item(item, out);
    }
    if pretty {
        out.push('\n');
        push_indent(depth, out);
    }
    out.push(close);
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_float(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "+inf" } else { "-inf" });
    } else {
        let _ = write!(out, "{f:e}");
    }
}

fn write_symbol(symbol: &Symbol, out: &mut String) {
    match symbol {
        Symbol::Text(text) if is_identifier(text) => out.push_str(text),
        Symbol::Text(text) => write_quoted(text, '\'', out),
        Symbol::Unknown(sid) => {
            let _ = write!(out, "${sid}");
        }
    }
}

/// Whether `text` can be written as a bare symbol. Keywords, `$<digits>`
/// (which would read back as a symbol ID) and `$ion_<major>_<minor>` (a
/// version marker at top level) need quotes.
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return false;
    }
    if matches!(text, "null" | "true" | "false" | "nan") {
        return false;
    }
    if text.len() > 1 && text.starts_with('$') && text[1..].bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    !is_version_marker(text)
}

fn is_version_marker(text: &str) -> bool {
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    text.strip_prefix("$ion_")
        .and_then(|version| version.split_once('_'))
        .is_some_and(|(major, minor)| digits(major) && digits(minor))
}

fn write_quoted(text: &str, quote: char, out: &mut String) {
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

fn write_clob(bytes: &[u8], out: &mut String) {
    out.push_str("{{\"");
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7E => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push_str("\"}}");
}
