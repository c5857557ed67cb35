use std::io::{ErrorKind, Read};
use std::ops::Range;

use ionzst_types::symbol::system_symbol;
use ionzst_types::{Element, IonType, SymbolTable};
use ionzst_wire::descriptor::{TypeCode, TypeDescriptor};
use ionzst_wire::varint::MAX_VAR_UINT_BYTES;

use crate::error::DecodeError;
use crate::parse;

/// A top-level user value, framed but not yet parsed.
///
/// The body bytes live in the reader's buffer until the next call to
/// [`BinaryReader::next_raw`]; fetch them with [`BinaryReader::body`].
#[derive(Clone, Debug)]
pub struct RawValue {
    /// Annotation symbol IDs, outermost first. Empty when unannotated.
    pub annotations: Vec<u64>,
    /// Descriptor of the value itself, inside any annotation wrapper.
    pub descriptor: TypeDescriptor,
    /// Stream offset of the value's first byte.
    pub offset: u64,
    body: Range<usize>,
    body_offset: u64,
}

impl RawValue {
    pub fn ion_type(&self) -> IonType {
        parse::ion_type(self.descriptor.code)
    }

    pub fn is_null(&self) -> bool {
        self.descriptor.is_null()
    }

    fn is_symbol_table(&self) -> bool {
        self.annotations.first() == Some(&system_symbol::ION_SYMBOL_TABLE)
            && self.descriptor.code == TypeCode::Struct
    }
}

/// Streaming Ion 1.0 binary reader over any [`Read`] source.
///
/// The stream must begin with the version marker `E0 01 00 EA`; an empty
/// stream simply has no values. System values are consumed transparently:
///
/// ```text
///   E0 01 00 EA                    → reset to the system symbol table
///   $ion_symbol_table::{...}       → define local symbols
///   NOP padding                    → skipped
///   anything else                  → yielded to the caller
/// ```
///
/// Each top-level value is read into one reusable buffer, so memory is
/// bounded by the largest top-level value rather than the stream.
///
/// # Example
///
/// ```rust
/// use ionzst_decoder::BinaryReader;
///
/// let bytes = [0xE0, 0x01, 0x00, 0xEA, 0x21, 0x2A];
/// let mut reader = BinaryReader::new(&bytes[..]);
/// let element = reader.next_element().unwrap().unwrap();
/// assert_eq!(element, ionzst_types::Element::from(42i64));
/// assert!(reader.next_element().unwrap().is_none());
/// ```
pub struct BinaryReader<R> {
    source: R,
    offset: u64,
    symbols: SymbolTable,
    state: ReaderState,
    buf: Vec<u8>,
}

/// ```text
///   Start ──marker──▶ Values ──end of input──▶ Done
///     └───────────empty input────────────────────▲
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReaderState {
    Start,
    Values,
    Done,
}

impl<R: Read> BinaryReader<R> {
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            source,
            offset: 0,
            symbols: SymbolTable::new(),
            state: ReaderState::Start,
            buf: Vec::with_capacity(4096),
        }
    }

    /// Bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The symbol table currently in effect.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Frame the next top-level user value.
    ///
    /// Returns `Ok(None)` once the input ends cleanly at a value boundary.
    ///
    /// # Errors
    ///
    /// Source read failures, a missing or unsupported version marker, and
    /// any framing error (truncated value, invalid descriptor, malformed
    /// symbol table).
    pub fn next_raw(&mut self) -> Result<Option<RawValue>, DecodeError> {
        match self.state {
            ReaderState::Done => return Ok(None),
            ReaderState::Start => {
                if !self.read_initial_marker()? {
                    self.state = ReaderState::Done;
                    return Ok(None);
                }
                self.state = ReaderState::Values;
            }
            ReaderState::Values => {}
        }

        loop {
            let offset = self.offset;
            let Some(byte) = self.read_byte_or_eof()? else {
                self.state = ReaderState::Done;
                return Ok(None);
            };
            let descriptor = TypeDescriptor::from_byte(byte);

            if descriptor.is_marker() {
                self.read_marker_tail(offset, false)?;
                self.symbols.reset();
                continue;
            }

            let len = parse::body_length(descriptor, byte, offset, || self.read_var_uint())?;
            let body_offset = self.offset;
            self.fill(len)?;
            if descriptor.is_nop() {
                continue;
            }

            let raw = if descriptor.code == TypeCode::Annotation {
                let wrapped = parse::split_annotations(&self.buf, body_offset)?;
                let start = usize::try_from(wrapped.body_offset - body_offset).unwrap_or(0);
                RawValue {
                    annotations: wrapped.annotations,
                    descriptor: wrapped.descriptor,
                    offset,
                    body: start..start + wrapped.body.len(),
                    body_offset: wrapped.body_offset,
                }
            } else {
                RawValue {
                    annotations: Vec::new(),
                    descriptor,
                    offset,
                    body: 0..len,
                    body_offset,
                }
            };

            if raw.is_symbol_table() {
                self.load_symbol_table(&raw)?;
                continue;
            }
            return Ok(Some(raw));
        }
    }

    /// Body bytes of the value most recently returned by
    /// [`next_raw`](Self::next_raw).
    pub fn body(&self, raw: &RawValue) -> &[u8] {
        &self.buf[raw.body.clone()]
    }

    /// Read and fully parse the next top-level user value.
    ///
    /// # Errors
    ///
    /// Everything [`next_raw`](Self::next_raw) reports, plus malformed value
    /// bodies and undefined symbol IDs.
    pub fn next_element(&mut self) -> Result<Option<Element>, DecodeError> {
        let Some(raw) = self.next_raw()? else {
            return Ok(None);
        };
        let element = parse::parse_annotated(
            &raw.annotations,
            raw.descriptor,
            self.body(&raw),
            raw.body_offset,
            &self.symbols,
        )?;
        Ok(Some(element))
    }

    fn load_symbol_table(&mut self, raw: &RawValue) -> Result<(), DecodeError> {
        if raw.is_null() {
            self.symbols.reset();
            return Ok(());
        }
        let table = parse::parse_local_table(self.body(raw), raw.body_offset, &self.symbols)?;
        if !table.append {
            self.symbols.reset();
        }
        self.symbols.add_unknown(table.imported_slots);
        for text in table.symbols {
            self.symbols.add(text);
        }
        Ok(())
    }

    /// `false` for an empty stream.
    fn read_initial_marker(&mut self) -> Result<bool, DecodeError> {
        match self.read_byte_or_eof()? {
            None => Ok(false),
            Some(0xE0) => {
                self.read_marker_tail(0, true)?;
                Ok(true)
            }
            Some(_) => Err(DecodeError::MissingMarker),
        }
    }

    /// Check the three bytes after a leading `0xE0`.
    fn read_marker_tail(&mut self, offset: u64, initial: bool) -> Result<(), DecodeError> {
        let mut tail = [0u8; 3];
        for slot in &mut tail {
            *slot = self.read_byte()?;
        }
        match tail {
            [0x01, 0x00, 0xEA] => Ok(()),
            [major, minor, 0xEA] => Err(DecodeError::UnsupportedVersion { major, minor }),
            _ if initial => Err(DecodeError::MissingMarker),
            _ => Err(DecodeError::InvalidDescriptor { byte: 0xE0, offset }),
        }
    }

    fn read_byte_or_eof(&mut self) -> Result<Option<u8>, DecodeError> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
    }

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let offset = self.offset;
        self.read_byte_or_eof()?
            .ok_or(DecodeError::UnexpectedEof { offset })
    }

    fn read_var_uint(&mut self) -> Result<u64, DecodeError> {
        let offset = self.offset;
        let mut value: u64 = 0;
        for _ in 0..MAX_VAR_UINT_BYTES {
            let byte = self.read_byte()?;
            if value > u64::MAX >> 7 {
                break;
            }
            value = (value << 7) | u64::from(byte & 0x7F);
            if byte & 0x80 != 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::Malformed {
            reason: "variable-length integer too long",
            offset,
        })
    }

    /// Read exactly `len` bytes into the value buffer.
    fn fill(&mut self, len: usize) -> Result<(), DecodeError> {
        self.buf.clear();
        let got = self
            .source
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut self.buf)?;
        self.offset += got as u64;
        if got < len {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset,
            });
        }
        Ok(())
    }
}
