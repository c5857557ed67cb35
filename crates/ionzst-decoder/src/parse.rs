//! Parsing of value bodies already held in memory.
//!
//! The streaming [`BinaryReader`](crate::BinaryReader) frames top-level
//! values; everything below the top level (container contents, annotation
//! wrappers, scalars) is parsed here from slices.

use ionzst_types::symbol::system_symbol;
use ionzst_types::timestamp::UtcComponents;
use ionzst_types::{
    Decimal, Element, Int, IonType, Precision, Symbol, SymbolTable, Timestamp, Value,
};
use ionzst_wire::WireError;
use ionzst_wire::descriptor::{LENGTH_NULL, TypeCode, TypeDescriptor};
use ionzst_wire::varint::{NEGATIVE_ZERO_VAR_INT, decode_int, decode_uint, decode_var_int, decode_var_uint};

use crate::error::DecodeError;

/// Upper bound on symbol slots a single shared import may reserve.
const MAX_IMPORTED_SYMBOLS: u64 = 1 << 20;

/// A read position within an in-memory body, tracking the absolute stream
/// offset for error reporting.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], base: u64) -> Self {
        Self { bytes, pos: 0, base }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.bytes.get(self.pos).ok_or(DecodeError::UnexpectedEof {
            offset: self.offset(),
        })?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.bytes.len() - self.pos < len {
            return Err(DecodeError::UnexpectedEof {
                offset: self.base + self.bytes.len() as u64,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn var_uint(&mut self) -> Result<u64, DecodeError> {
        let at = self.offset();
        let (value, used) = decode_var_uint(self.rest()).map_err(|e| wire_error(e, at))?;
        self.pos += used;
        Ok(value)
    }

    fn var_int(&mut self) -> Result<i64, DecodeError> {
        let at = self.offset();
        let (value, used) = decode_var_int(self.rest()).map_err(|e| wire_error(e, at))?;
        self.pos += used;
        Ok(value)
    }

    /// Read one value header and body, skipping NOP padding. `None` at the
    /// end of the slice.
    fn next_framed(&mut self) -> Result<Option<Framed<'a>>, DecodeError> {
        while !self.is_empty() {
            if let Some(framed) = next_framed_or_pad(self)? {
                return Ok(Some(framed));
            }
        }
        Ok(None)
    }

    /// Next element of a container body.
    pub(crate) fn next_element(
        &mut self,
        symbols: &SymbolTable,
    ) -> Result<Option<Element>, DecodeError> {
        match self.next_framed()? {
            Some(framed) => parse_element(framed.descriptor, framed.body, framed.body_offset, symbols)
                .map(Some),
            None => Ok(None),
        }
    }
}

struct Framed<'a> {
    descriptor: TypeDescriptor,
    body: &'a [u8],
    offset: u64,
    body_offset: u64,
}

/// The pieces of an annotation wrapper.
pub(crate) struct Wrapped<'a> {
    pub annotations: Vec<u64>,
    pub descriptor: TypeDescriptor,
    pub body: &'a [u8],
    pub body_offset: u64,
}

pub(crate) fn wire_error(err: WireError, at: u64) -> DecodeError {
    match err {
        WireError::UnexpectedEof { offset } => DecodeError::UnexpectedEof {
            offset: at + offset as u64,
        },
        WireError::VarIntTooLong { offset } => DecodeError::Malformed {
            reason: "variable-length integer too long",
            offset: at + offset as u64,
        },
        other => DecodeError::Wire(other),
    }
}

/// Body length for `descriptor`, reading the `VarUInt` length through
/// `var_uint` when one follows. Rejects descriptors no value may carry;
/// the version marker (`0xE0`) is the caller's concern.
pub(crate) fn body_length<F>(
    descriptor: TypeDescriptor,
    byte: u8,
    offset: u64,
    var_uint: F,
) -> Result<usize, DecodeError>
where
    F: FnOnce() -> Result<u64, DecodeError>,
{
    let invalid = DecodeError::InvalidDescriptor { byte, offset };
    match descriptor.code {
        TypeCode::Reserved => return Err(invalid),
        TypeCode::Bool if descriptor.length_code > 1 && descriptor.length_code != LENGTH_NULL => {
            return Err(invalid);
        }
        TypeCode::Annotation if descriptor.length_code < 3 || descriptor.length_code == LENGTH_NULL => {
            return Err(invalid);
        }
        _ => {}
    }
    if descriptor.has_var_uint_length() {
        let len = var_uint()?;
        return usize::try_from(len).map_err(|_| DecodeError::Malformed {
            reason: "length does not fit in memory",
            offset,
        });
    }
    Ok(descriptor.inline_length())
}

/// Split an annotation wrapper body into its symbol IDs and wrapped value.
pub(crate) fn split_annotations(body: &[u8], base: u64) -> Result<Wrapped<'_>, DecodeError> {
    let mut cursor = Cursor::new(body, base);
    let annot_len = cursor.var_uint()?;
    let annot_offset = cursor.offset();
    if annot_len == 0 {
        return Err(DecodeError::Malformed {
            reason: "annotation wrapper without annotations",
            offset: annot_offset,
        });
    }
    let annot_len = usize::try_from(annot_len).map_err(|_| DecodeError::Malformed {
        reason: "annotation length does not fit in memory",
        offset: annot_offset,
    })?;
    let mut sids = Cursor::new(cursor.take(annot_len)?, annot_offset);
    let mut annotations = Vec::new();
    while !sids.is_empty() {
        annotations.push(sids.var_uint()?);
    }

    let offset = cursor.offset();
    let byte = cursor.byte()?;
    let descriptor = TypeDescriptor::from_byte(byte);
    if descriptor.code == TypeCode::Annotation || descriptor.is_nop() {
        return Err(DecodeError::Malformed {
            reason: "annotation wrapper must hold exactly one value",
            offset,
        });
    }
    let len = body_length(descriptor, byte, offset, || cursor.var_uint())?;
    let body_offset = cursor.offset();
    let inner = cursor.take(len)?;
    if !cursor.is_empty() {
        return Err(DecodeError::Malformed {
            reason: "annotation wrapper length does not match its value",
            offset: cursor.offset(),
        });
    }
    Ok(Wrapped {
        annotations,
        descriptor,
        body: inner,
        body_offset,
    })
}

/// Ion type carried by a value descriptor. Annotation wrappers and the
/// reserved code never reach here.
pub(crate) fn ion_type(code: TypeCode) -> IonType {
    match code {
        TypeCode::NullOrNop | TypeCode::Annotation | TypeCode::Reserved => IonType::Null,
        TypeCode::Bool => IonType::Bool,
        TypeCode::PositiveInt | TypeCode::NegativeInt => IonType::Int,
        TypeCode::Float => IonType::Float,
        TypeCode::Decimal => IonType::Decimal,
        TypeCode::Timestamp => IonType::Timestamp,
        TypeCode::Symbol => IonType::Symbol,
        TypeCode::String => IonType::String,
        TypeCode::Clob => IonType::Clob,
        TypeCode::Blob => IonType::Blob,
        TypeCode::List => IonType::List,
        TypeCode::SExp => IonType::SExp,
        TypeCode::Struct => IonType::Struct,
    }
}

pub(crate) fn resolve(symbols: &SymbolTable, sid: u64, offset: u64) -> Result<Symbol, DecodeError> {
    symbols.resolve(sid).ok_or(DecodeError::SymbolOutOfRange {
        sid,
        max_id: symbols.max_id(),
        offset,
    })
}

/// Parse a value that may be an annotation wrapper.
pub(crate) fn parse_element(
    descriptor: TypeDescriptor,
    body: &[u8],
    body_offset: u64,
    symbols: &SymbolTable,
) -> Result<Element, DecodeError> {
    if descriptor.code != TypeCode::Annotation {
        return Ok(Element::new(parse_value(descriptor, body, body_offset, symbols)?));
    }
    let wrapped = split_annotations(body, body_offset)?;
    parse_annotated(
        &wrapped.annotations,
        wrapped.descriptor,
        wrapped.body,
        wrapped.body_offset,
        symbols,
    )
}

/// Parse an unwrapped value and attach already-split annotations.
pub(crate) fn parse_annotated(
    annotations: &[u64],
    descriptor: TypeDescriptor,
    body: &[u8],
    body_offset: u64,
    symbols: &SymbolTable,
) -> Result<Element, DecodeError> {
    let annotations = annotations
        .iter()
        .map(|&sid| resolve(symbols, sid, body_offset))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Element {
        annotations,
        value: parse_value(descriptor, body, body_offset, symbols)?,
    })
}

/// Parse the body of a non-annotation value.
pub(crate) fn parse_value(
    descriptor: TypeDescriptor,
    body: &[u8],
    offset: u64,
    symbols: &SymbolTable,
) -> Result<Value, DecodeError> {
    if descriptor.is_null() {
        return Ok(Value::Null(ion_type(descriptor.code)));
    }
    let value = match descriptor.code {
        TypeCode::Bool => Value::Bool(descriptor.length_code == 1),
        TypeCode::PositiveInt => Value::Int(Int::from_parts(false, body)),
        TypeCode::NegativeInt => {
            let int = Int::from_parts(true, body);
            if int.is_zero() {
                return Err(DecodeError::Malformed {
                    reason: "negative int with zero magnitude",
                    offset,
                });
            }
            Value::Int(int)
        }
        TypeCode::Float => Value::Float(parse_float(body, offset)?),
        TypeCode::Decimal => Value::Decimal(parse_decimal(body, offset)?),
        TypeCode::Timestamp => Value::Timestamp(parse_timestamp(body, offset)?),
        TypeCode::Symbol => {
            let sid = decode_uint(body).map_err(|e| wire_error(e, offset))?;
            Value::Symbol(resolve(symbols, sid, offset)?)
        }
        TypeCode::String => Value::String(
            String::from_utf8(body.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { offset })?,
        ),
        TypeCode::Clob => Value::Clob(body.to_vec()),
        TypeCode::Blob => Value::Blob(body.to_vec()),
        TypeCode::List | TypeCode::SExp => {
            let mut items = Vec::new();
            let mut cursor = Cursor::new(body, offset);
            while let Some(item) = cursor.next_element(symbols)? {
                items.push(item);
            }
            if descriptor.code == TypeCode::List {
                Value::List(items)
            } else {
                Value::SExp(items)
            }
        }
        TypeCode::Struct => Value::Struct(parse_fields(body, offset, symbols)?),
        TypeCode::NullOrNop | TypeCode::Annotation | TypeCode::Reserved => {
            return Err(DecodeError::Malformed {
                reason: "not a value",
                offset,
            });
        }
    };
    Ok(value)
}

fn parse_fields(
    body: &[u8],
    offset: u64,
    symbols: &SymbolTable,
) -> Result<Vec<(Symbol, Element)>, DecodeError> {
    let mut fields = Vec::new();
    let mut cursor = Cursor::new(body, offset);
    while !cursor.is_empty() {
        let name_offset = cursor.offset();
        let sid = cursor.var_uint()?;
        // a field name followed by NOP padding is padding too
        let Some(framed) = next_framed_or_pad(&mut cursor)? else {
            continue;
        };
        let name = resolve(symbols, sid, name_offset)?;
        let value = parse_element(framed.descriptor, framed.body, framed.body_offset, symbols)?;
        fields.push((name, value));
    }
    Ok(fields)
}

/// Read exactly one value header and body; `None` when it is padding.
fn next_framed_or_pad<'a>(cursor: &mut Cursor<'a>) -> Result<Option<Framed<'a>>, DecodeError> {
    let offset = cursor.offset();
    let byte = cursor.byte()?;
    let descriptor = TypeDescriptor::from_byte(byte);
    if descriptor.is_marker() {
        return Err(DecodeError::InvalidDescriptor { byte, offset });
    }
    let len = body_length(descriptor, byte, offset, || cursor.var_uint())?;
    let body_offset = cursor.offset();
    let body = cursor.take(len)?;
    if descriptor.is_nop() {
        return Ok(None);
    }
    Ok(Some(Framed {
        descriptor,
        body,
        offset,
        body_offset,
    }))
}

fn parse_float(body: &[u8], offset: u64) -> Result<f64, DecodeError> {
    match body.len() {
        0 => Ok(0.0),
        4 => {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(body);
            Ok(f64::from(f32::from_be_bytes(bytes)))
        }
        8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(body);
            Ok(f64::from_be_bytes(bytes))
        }
        _ => Err(DecodeError::Malformed {
            reason: "float must be 0, 4 or 8 bytes",
            offset,
        }),
    }
}

fn parse_decimal(body: &[u8], offset: u64) -> Result<Decimal, DecodeError> {
    if body.is_empty() {
        return Ok(Decimal::new(0i64, 0));
    }
    let mut cursor = Cursor::new(body, offset);
    let exponent = cursor.var_int()?;
    let (negative, magnitude) = decode_int(cursor.rest());
    Ok(Decimal::new(Int::from_parts(negative, &magnitude), exponent))
}

fn narrow<T: TryFrom<u64>>(value: u64, reason: &'static str, offset: u64) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::Malformed { reason, offset })
}

fn parse_timestamp(body: &[u8], offset: u64) -> Result<Timestamp, DecodeError> {
    let mut cursor = Cursor::new(body, offset);
    let local_offset = if body.first() == Some(&NEGATIVE_ZERO_VAR_INT) {
        cursor.byte()?;
        None
    } else {
        let minutes = cursor.var_int()?;
        Some(i16::try_from(minutes).map_err(|_| DecodeError::Malformed {
            reason: "timestamp offset out of range",
            offset,
        })?)
    };

    let year = narrow(cursor.var_uint()?, "timestamp year out of range", offset)?;
    let mut utc = UtcComponents {
        year,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
    };
    let mut precision = Precision::Year;
    let mut second = 0;
    let mut fraction = None;

    if !cursor.is_empty() {
        utc.month = narrow(cursor.var_uint()?, "timestamp month out of range", offset)?;
        precision = Precision::Month;
    }
    if !cursor.is_empty() {
        utc.day = narrow(cursor.var_uint()?, "timestamp day out of range", offset)?;
        precision = Precision::Day;
    }
    if !cursor.is_empty() {
        utc.hour = narrow(cursor.var_uint()?, "timestamp hour out of range", offset)?;
        if cursor.is_empty() {
            return Err(DecodeError::Malformed {
                reason: "timestamp hour without minute",
                offset,
            });
        }
        utc.minute = narrow(cursor.var_uint()?, "timestamp minute out of range", offset)?;
        precision = Precision::Minute;
    }
    if !cursor.is_empty() {
        second = narrow(cursor.var_uint()?, "timestamp second out of range", offset)?;
        precision = Precision::Second;
    }
    if !cursor.is_empty() {
        let exponent = cursor.var_int()?;
        let (negative, magnitude) = decode_int(cursor.rest());
        fraction = Some(Decimal::new(Int::from_parts(negative, &magnitude), exponent));
        precision = Precision::Fraction;
    }

    Ok(Timestamp::from_utc(precision, utc, second, fraction, local_offset)?)
}

/// The effect of one local symbol table on the reader's symbols.
pub(crate) struct LocalTable {
    pub append: bool,
    pub imported_slots: usize,
    pub symbols: Vec<Option<String>>,
}

/// Read a `$ion_symbol_table` struct body. Fields other than `imports` and
/// `symbols` are ignored without being parsed.
pub(crate) fn parse_local_table(
    body: &[u8],
    offset: u64,
    current: &SymbolTable,
) -> Result<LocalTable, DecodeError> {
    let mut table = LocalTable {
        append: false,
        imported_slots: 0,
        symbols: Vec::new(),
    };
    let mut seen_imports = false;
    let mut seen_symbols = false;

    let mut cursor = Cursor::new(body, offset);
    while !cursor.is_empty() {
        let name_offset = cursor.offset();
        let sid = cursor.var_uint()?;
        let Some(framed) = next_framed_or_pad(&mut cursor)? else {
            continue;
        };
        match sid {
            system_symbol::IMPORTS => {
                if seen_imports {
                    return Err(DecodeError::Malformed {
                        reason: "duplicate imports field in symbol table",
                        offset: name_offset,
                    });
                }
                seen_imports = true;
                let imports =
                    parse_element(framed.descriptor, framed.body, framed.body_offset, current)?;
                match imports.value {
                    Value::Symbol(Symbol::Text(text)) if text == "$ion_symbol_table" => {
                        table.append = true;
                    }
                    Value::List(imports) => {
                        let mut total = 0u64;
                        for import in &imports {
                            total += imported_slots(import, framed.offset)?;
                            if total > MAX_IMPORTED_SYMBOLS {
                                return Err(DecodeError::Malformed {
                                    reason: "shared imports too large",
                                    offset: framed.offset,
                                });
                            }
                        }
                        table.imported_slots =
                            narrow(total, "shared imports too large", framed.offset)?;
                    }
                    _ => {}
                }
            }
            system_symbol::SYMBOLS => {
                if seen_symbols {
                    return Err(DecodeError::Malformed {
                        reason: "duplicate symbols field in symbol table",
                        offset: name_offset,
                    });
                }
                seen_symbols = true;
                let symbols =
                    parse_element(framed.descriptor, framed.body, framed.body_offset, current)?;
                if let Value::List(items) = symbols.value {
                    table.symbols = items
                        .into_iter()
                        .map(|item| match item.value {
                            Value::String(text) => Some(text),
                            _ => None,
                        })
                        .collect();
                }
            }
            _ => {}
        }
    }
    Ok(table)
}

/// Slots reserved by one shared import. Shared tables are never resolved,
/// so their symbols keep unknown text.
fn imported_slots(import: &Element, offset: u64) -> Result<u64, DecodeError> {
    let Value::Struct(_) = import.value else {
        return Ok(0);
    };
    let max_id = import
        .field("max_id")
        .and_then(|field| match &field.value {
            Value::Int(int) if !int.is_negative() => int.as_i64(),
            _ => None,
        })
        .ok_or(DecodeError::Malformed {
            reason: "shared import without max_id",
            offset,
        })?;
    let max_id = max_id.unsigned_abs();
    if max_id > MAX_IMPORTED_SYMBOLS {
        return Err(DecodeError::Malformed {
            reason: "shared import too large",
            offset,
        });
    }
    Ok(max_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Element {
        let mut cursor = Cursor::new(bytes, 0);
        cursor
            .next_element(&SymbolTable::new())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn ints_of_any_width() {
        assert_eq!(parse(&[0x20]).value, Value::Int(Int::from(0i64)));
        assert_eq!(parse(&[0x21, 0x2A]).value, Value::Int(Int::from(42i64)));
        assert_eq!(parse(&[0x31, 0x2A]).value, Value::Int(Int::from(-42i64)));
        let big = parse(&[0x29, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
        let Value::Int(int) = big.value else {
            panic!("expected int");
        };
        assert_eq!(int.as_i64(), None);
        assert_eq!(int.to_string(), "18446744073709551616");
    }

    #[test]
    fn negative_zero_int_is_rejected() {
        let mut cursor = Cursor::new(&[0x30], 0);
        assert!(matches!(
            cursor.next_element(&SymbolTable::new()),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn floats() {
        assert_eq!(parse(&[0x40]).value, Value::Float(0.0));
        assert_eq!(parse(&[0x44, 0x3F, 0xC0, 0, 0]).value, Value::Float(1.5));
        assert_eq!(
            parse(&[0x48, 0x3F, 0xF8, 0, 0, 0, 0, 0, 0]).value,
            Value::Float(1.5)
        );
    }

    #[test]
    fn decimals() {
        assert_eq!(parse(&[0x50]).value, Value::Decimal(Decimal::new(0i64, 0)));
        assert_eq!(
            parse(&[0x52, 0xC1, 0x0F]).value,
            Value::Decimal(Decimal::new(15i64, -1))
        );
        let Value::Decimal(negative_zero) = parse(&[0x52, 0x80, 0x80]).value else {
            panic!("expected decimal");
        };
        assert_eq!(negative_zero.to_string(), "-0d0");
    }

    #[test]
    fn nop_padding_is_skipped() {
        // 2-byte NOP pad, then true
        assert_eq!(parse(&[0x01, 0xFF, 0x11]).value, Value::Bool(true));
    }

    #[test]
    fn containers() {
        // [1, "a"]
        let list = parse(&[0xB4, 0x21, 0x01, 0x81, b'a']);
        assert_eq!(
            list.value,
            Value::List(vec![Element::from(1i64), Element::from("a")])
        );
        // {name: true} with a padded field in the middle
        let st = parse(&[0xD4, 0x84, 0x11, 0x85, 0x00]);
        let Value::Struct(fields) = st.value else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, Symbol::from("name"));
    }

    #[test]
    fn annotations_resolve() {
        let element = parse(&[0xE4, 0x81, 0x84, 0xA1, 0x01]);
        assert_eq!(element.annotations, vec![Symbol::from("name")]);
        assert_eq!(element.value, Value::Blob(vec![1]));
    }

    #[test]
    fn annotation_wrapper_length_must_match() {
        let mut cursor = Cursor::new(&[0xE5, 0x81, 0x84, 0xA1, 0x01, 0x00], 0);
        assert!(matches!(
            cursor.next_element(&SymbolTable::new()),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn symbol_out_of_range() {
        let mut cursor = Cursor::new(&[0x71, 0x0A], 0);
        assert!(matches!(
            cursor.next_element(&SymbolTable::new()),
            Err(DecodeError::SymbolOutOfRange { sid: 10, max_id: 9, .. })
        ));
    }

    #[test]
    fn symbol_zero_is_unknown() {
        assert_eq!(parse(&[0x70]).value, Value::Symbol(Symbol::Unknown(0)));
    }

    #[test]
    fn timestamp_day_precision() {
        let element = parse(&[0x65, 0xC0, 0x0F, 0xE8, 0x85, 0x91]);
        assert_eq!(
            element.value,
            Value::Timestamp(Timestamp::date(2024, 5, 17).unwrap())
        );
    }

    #[test]
    fn timestamp_converts_to_local_time() {
        let element = parse(&[0x67, 0xBC, 0x0F, 0xE8, 0x81, 0x81, 0x80, 0x80]);
        let Value::Timestamp(ts) = element.value else {
            panic!("expected timestamp");
        };
        assert_eq!(ts.to_string(), "2024-01-01T01:00+01:00");
    }

    #[test]
    fn truncated_body() {
        let mut cursor = Cursor::new(&[0x83, b'a'], 0);
        assert!(matches!(
            cursor.next_element(&SymbolTable::new()),
            Err(DecodeError::UnexpectedEof { offset: 2 })
        ));
    }

    #[test]
    fn reserved_and_marker_descriptors_are_invalid() {
        for byte in [0xF0, 0xE0, 0x12, 0xE1] {
            let bytes = [byte, 0, 0, 0];
            let mut cursor = Cursor::new(&bytes, 0);
            assert!(matches!(
                cursor.next_element(&SymbolTable::new()),
                Err(DecodeError::InvalidDescriptor { .. })
            ));
        }
    }

    #[test]
    fn local_table_with_imports() {
        // {imports: [{max_id: 2}], symbols: ["x", 1]}
        let body = [
            0x86, 0xB4, 0xD3, 0x88, 0x21, 0x02, // imports
            0x87, 0xB4, 0x81, b'x', 0x21, 0x01, // symbols
        ];
        let table = parse_local_table(&body, 0, &SymbolTable::new()).unwrap();
        assert!(!table.append);
        assert_eq!(table.imported_slots, 2);
        assert_eq!(table.symbols, vec![Some("x".to_owned()), None]);
    }

    #[test]
    fn local_table_append() {
        // {imports: $ion_symbol_table}
        let body = [0x86, 0x71, 0x03];
        let table = parse_local_table(&body, 0, &SymbolTable::new()).unwrap();
        assert!(table.append);
    }

    #[test]
    fn imports_are_capped_in_total() {
        // {max_id: 1 << 20}
        let import = [0xD5, 0x88, 0x23, 0x10, 0x00, 0x00];

        let mut one = vec![0x86, 0xB6];
        one.extend_from_slice(&import);
        let table = parse_local_table(&one, 0, &SymbolTable::new()).unwrap();
        assert_eq!(table.imported_slots, 1 << 20);

        let mut two = vec![0x86, 0xBC];
        two.extend_from_slice(&import);
        two.extend_from_slice(&import);
        assert!(matches!(
            parse_local_table(&two, 0, &SymbolTable::new()),
            Err(DecodeError::Malformed {
                reason: "shared imports too large",
                ..
            })
        ));
    }

    #[test]
    fn import_without_max_id() {
        let body = [0x86, 0xB2, 0xD0 | 14, 0x80];
        assert!(parse_local_table(&body, 0, &SymbolTable::new()).is_err());
    }
}
