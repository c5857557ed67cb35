use ionzst_types::{Element, IonType, Symbol, SymbolTable, Timestamp, Value};
use ionzst_types::timestamp::Precision;
use ionzst_wire::ION_MARKER;
use ionzst_wire::descriptor::{TypeCode, TypeDescriptor};
use ionzst_wire::varint::{
    NEGATIVE_ZERO_VAR_INT, encode_int, encode_uint, encode_var_int, encode_var_uint,
};

use crate::error::EncodeError;

/// Ion 1.0 binary writer.
///
/// Values are encoded as they are written; symbol text is interned into a
/// local symbol table as it is first seen. [`finish`](Self::finish) emits
/// the version marker, the local symbol table (when any symbols were
/// interned) and then the encoded values, in that order.
///
/// # Usage
///
/// ```rust
/// use ionzst_encoder::BinaryWriter;
/// use ionzst_types::Element;
///
/// let mut writer = BinaryWriter::new();
/// writer
///     .write(&Element::structure([("a", Element::from(1i64))]))
///     .unwrap();
/// let bytes = writer.finish().unwrap();
/// assert_eq!(&bytes[..4], &[0xE0, 0x01, 0x00, 0xEA]);
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────────┐
/// │ [4 bytes]    │ E0 01 00 EA (omitted by without_marker)       │
/// │ [N bytes]    │ $ion_symbol_table::{symbols: ["a", ...]}      │
/// │ [N bytes]    │ value 0, value 1, ...                         │
/// └──────────────┴───────────────────────────────────────────────┘
/// ```
pub struct BinaryWriter {
    symbols: SymbolTable,
    body: Vec<u8>,
    marker: bool,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            body: Vec::new(),
            marker: true,
        }
    }

    /// A writer whose output lacks the leading version marker, as in the
    /// payload of an `ion.zst` object.
    pub fn without_marker() -> Self {
        Self {
            marker: false,
            ..Self::new()
        }
    }

    /// Encode one top-level value.
    ///
    /// # Errors
    ///
    /// [`EncodeError::UnknownSymbolId`] for a [`Symbol::Unknown`] beyond the
    /// symbol table, [`EncodeError::Type`] for a timestamp that cannot be
    /// expressed in UTC.
    pub fn write(&mut self, element: &Element) -> Result<&mut Self, EncodeError> {
        let mut buf = Vec::new();
        self.encode_element(element, &mut buf)?;
        self.body.extend_from_slice(&buf);
        Ok(self)
    }

    /// Encode every value of `elements` in order.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_all<'a, I>(&mut self, elements: I) -> Result<&mut Self, EncodeError>
    where
        I: IntoIterator<Item = &'a Element>,
    {
        for element in elements {
            self.write(element)?;
        }
        Ok(self)
    }

    /// Assemble the marker, symbol table and values.
    ///
    /// # Errors
    ///
    /// Only fails if the symbol table itself cannot be encoded, which does
    /// not happen for tables built by this writer.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::with_capacity(self.body.len() + 64);
        if self.marker {
            out.extend_from_slice(&ION_MARKER);
        }

        let locals = self.symbols.local_symbols().to_vec();
        if !locals.is_empty() {
            let texts = locals
                .into_iter()
                .map(|text| match text {
                    Some(text) => Element::new(Value::String(text)),
                    None => Element::new(Value::Null(IonType::String)),
                })
                .collect();
            let table = Element::new(Value::Struct(vec![(
                Symbol::from("symbols"),
                Element::new(Value::List(texts)),
            )]))
            .with_annotations(["$ion_symbol_table"]);
            self.encode_element(&table, &mut out)?;
        }

        out.extend_from_slice(&self.body);
        Ok(out)
    }

    fn symbol_id(&mut self, symbol: &Symbol) -> Result<u64, EncodeError> {
        match symbol {
            Symbol::Text(text) => Ok(self.symbols.intern(text)),
            Symbol::Unknown(sid) => {
                let max_id = self.symbols.max_id();
                if *sid > max_id {
                    return Err(EncodeError::UnknownSymbolId { sid: *sid, max_id });
                }
                Ok(*sid)
            }
        }
    }

    fn encode_element(&mut self, element: &Element, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        if element.annotations.is_empty() {
            return self.encode_value(&element.value, out);
        }

        let mut sids = Vec::new();
        for annotation in &element.annotations {
            let sid = self.symbol_id(annotation)?;
            encode_var_uint(sid, &mut sids);
        }

        let mut wrapper = Vec::new();
        encode_var_uint(sids.len() as u64, &mut wrapper);
        wrapper.extend_from_slice(&sids);
        self.encode_value(&element.value, &mut wrapper)?;

        write_header(TypeCode::Annotation, wrapper.len(), out);
        out.extend_from_slice(&wrapper);
        Ok(())
    }

    fn encode_value(&mut self, value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match value {
            Value::Null(ion_type) => {
                out.push((type_code(*ion_type) as u8) << 4 | 0x0F);
            }
            Value::Bool(b) => out.push(0x10 | u8::from(*b)),
            Value::Int(int) => {
                if int.is_zero() {
                    out.push(0x20);
                } else {
                    let code = if int.is_negative() {
                        TypeCode::NegativeInt
                    } else {
                        TypeCode::PositiveInt
                    };
                    write_header(code, int.magnitude().len(), out);
                    out.extend_from_slice(int.magnitude());
                }
            }
            Value::Float(f) => {
                write_header(TypeCode::Float, 8, out);
                out.extend_from_slice(&f.to_be_bytes());
            }
            Value::Decimal(decimal) => {
                let mut body = Vec::new();
                if decimal.exponent != 0
                    || !decimal.coefficient.is_zero()
                    || decimal.coefficient.is_negative()
                {
                    encode_var_int(decimal.exponent, &mut body);
                    encode_int(
                        decimal.coefficient.is_negative(),
                        decimal.coefficient.magnitude(),
                        &mut body,
                    );
                }
                write_header(TypeCode::Decimal, body.len(), out);
                out.extend_from_slice(&body);
            }
            Value::Timestamp(ts) => {
                let body = encode_timestamp(ts)?;
                write_header(TypeCode::Timestamp, body.len(), out);
                out.extend_from_slice(&body);
            }
            Value::Symbol(symbol) => {
                let sid = self.symbol_id(symbol)?;
                let mut body = Vec::new();
                if sid != 0 {
                    encode_uint(sid, &mut body);
                }
                write_header(TypeCode::Symbol, body.len(), out);
                out.extend_from_slice(&body);
            }
            Value::String(text) => {
                write_header(TypeCode::String, text.len(), out);
                out.extend_from_slice(text.as_bytes());
            }
            Value::Clob(bytes) => {
                write_header(TypeCode::Clob, bytes.len(), out);
                out.extend_from_slice(bytes);
            }
            Value::Blob(bytes) => {
                write_header(TypeCode::Blob, bytes.len(), out);
                out.extend_from_slice(bytes);
            }
            Value::List(items) | Value::SExp(items) => {
                let mut body = Vec::new();
                for item in items {
                    self.encode_element(item, &mut body)?;
                }
                let code = if matches!(value, Value::List(_)) {
                    TypeCode::List
                } else {
                    TypeCode::SExp
                };
                write_header(code, body.len(), out);
                out.extend_from_slice(&body);
            }
            Value::Struct(fields) => {
                let mut body = Vec::new();
                for (name, field) in fields {
                    let sid = self.symbol_id(name)?;
                    encode_var_uint(sid, &mut body);
                    self.encode_element(field, &mut body)?;
                }
                // every field is at least two bytes, so L=1 (sorted) never
                // comes out of write_header
                write_header(TypeCode::Struct, body.len(), out);
                out.extend_from_slice(&body);
            }
        }
        Ok(())
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `elements` as a standalone Ion binary stream, marker included.
///
/// # Errors
///
/// See [`BinaryWriter::write`].
pub fn encode<'a, I>(elements: I) -> Result<Vec<u8>, EncodeError>
where
    I: IntoIterator<Item = &'a Element>,
{
    let mut writer = BinaryWriter::new();
    writer.write_all(elements)?;
    writer.finish()
}

fn write_header(code: TypeCode, len: usize, out: &mut Vec<u8>) {
    out.push(TypeDescriptor::byte_for(code, len));
    if len >= 14 {
        encode_var_uint(len as u64, out);
    }
}

fn type_code(ion_type: IonType) -> TypeCode {
    match ion_type {
        IonType::Null => TypeCode::NullOrNop,
        IonType::Bool => TypeCode::Bool,
        IonType::Int => TypeCode::PositiveInt,
        IonType::Float => TypeCode::Float,
        IonType::Decimal => TypeCode::Decimal,
        IonType::Timestamp => TypeCode::Timestamp,
        IonType::Symbol => TypeCode::Symbol,
        IonType::String => TypeCode::String,
        IonType::Clob => TypeCode::Clob,
        IonType::Blob => TypeCode::Blob,
        IonType::List => TypeCode::List,
        IonType::SExp => TypeCode::SExp,
        IonType::Struct => TypeCode::Struct,
    }
}

fn encode_timestamp(ts: &Timestamp) -> Result<Vec<u8>, EncodeError> {
    let utc = ts.utc_components()?;
    let precision = ts.precision();
    let mut body = Vec::new();

    match ts.offset() {
        Some(minutes) if precision >= Precision::Minute => {
            encode_var_int(i64::from(minutes), &mut body);
        }
        _ => body.push(NEGATIVE_ZERO_VAR_INT),
    }

    encode_var_uint(u64::from(utc.year), &mut body);
    if precision >= Precision::Month {
        encode_var_uint(u64::from(utc.month), &mut body);
    }
    if precision >= Precision::Day {
        encode_var_uint(u64::from(utc.day), &mut body);
    }
    if precision >= Precision::Minute {
        encode_var_uint(u64::from(utc.hour), &mut body);
        encode_var_uint(u64::from(utc.minute), &mut body);
    }
    if precision >= Precision::Second {
        encode_var_uint(u64::from(ts.second()), &mut body);
    }
    if let Some(fraction) = ts.fraction() {
        encode_var_int(fraction.exponent, &mut body);
        encode_int(false, fraction.coefficient.magnitude(), &mut body);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ionzst_types::Decimal;
    use ionzst_types::symbol::system_symbol;

    fn encode_one(element: &Element) -> Vec<u8> {
        let mut writer = BinaryWriter::without_marker();
        writer.write(element).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn struct_with_local_symbol() {
        let bytes = encode(&[Element::structure([("a", Element::from(1i64))])]).unwrap();
        assert_eq!(
            bytes,
            vec![
                0xE0, 0x01, 0x00, 0xEA, // marker
                0xE7, 0x81, 0x83, 0xD4, 0x87, 0xB2, 0x81, 0x61, // symbol table
                0xD3, 0x8A, 0x21, 0x01, // {a: 1}
            ]
        );
    }

    #[test]
    fn scalars() {
        assert_eq!(encode_one(&Element::from(true)), vec![0x11]);
        assert_eq!(encode_one(&Element::from(0i64)), vec![0x20]);
        assert_eq!(encode_one(&Element::from(-258i64)), vec![0x32, 0x01, 0x02]);
        assert_eq!(encode_one(&Element::new(Value::Null(IonType::Blob))), vec![0xAF]);
        assert_eq!(encode_one(&Element::new(Value::Null(IonType::Null))), vec![0x0F]);
        assert_eq!(encode_one(&Element::from("hi")), vec![0x82, b'h', b'i']);
        assert_eq!(
            encode_one(&Element::from(1.5f64)),
            vec![0x48, 0x3F, 0xF8, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn decimals() {
        assert_eq!(encode_one(&Element::from(Decimal::new(0i64, 0))), vec![0x50]);
        // 1.5 = 15 x 10^-1
        assert_eq!(
            encode_one(&Element::from(Decimal::new(15i64, -1))),
            vec![0x52, 0xC1, 0x0F]
        );
    }

    #[test]
    fn long_blob_uses_var_uint_length() {
        let bytes = encode_one(&Element::new(Value::Blob(vec![7; 20])));
        assert_eq!(&bytes[..2], &[0xAE, 0x94]);
        assert_eq!(bytes.len(), 22);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(encode_one(&Element::new(Value::List(vec![]))), vec![0xB0]);
        assert_eq!(encode_one(&Element::new(Value::SExp(vec![]))), vec![0xC0]);
        assert_eq!(encode_one(&Element::new(Value::Struct(vec![]))), vec![0xD0]);
    }

    #[test]
    fn timestamp_with_unknown_offset() {
        let ts = Timestamp::date(2024, 5, 17).unwrap();
        // -0 offset, 2024 = 0x0F 0xE8 as VarUInt, month, day
        assert_eq!(
            encode_one(&Element::from(ts)),
            vec![0x65, 0xC0, 0x0F, 0xE8, 0x85, 0x91]
        );
    }

    #[test]
    fn timestamp_is_stored_in_utc() {
        let ts = Timestamp::date(2024, 1, 1)
            .unwrap()
            .at_minute(1, 0, Some(60))
            .unwrap();
        // +60 minutes = VarInt 0xBC, then 2024-01-01 00:00 UTC
        assert_eq!(
            encode_one(&Element::from(ts)),
            vec![0x67, 0xBC, 0x0F, 0xE8, 0x81, 0x81, 0x80, 0x80]
        );
    }

    #[test]
    fn unknown_symbols_must_be_defined() {
        let ok = encode_one(&Element::new(Value::Symbol(Symbol::Unknown(4))));
        assert_eq!(ok, vec![0x71, 0x04]);
        let zero = encode_one(&Element::new(Value::Symbol(Symbol::Unknown(0))));
        assert_eq!(zero, vec![0x70]);

        let mut writer = BinaryWriter::new();
        let err = writer
            .write(&Element::new(Value::Symbol(Symbol::Unknown(42))))
            .err()
            .unwrap();
        assert!(matches!(err, EncodeError::UnknownSymbolId { sid: 42, max_id: 9 }));
    }

    #[test]
    fn system_symbols_are_not_redefined() {
        let bytes = encode_one(&Element::new(Value::Symbol(Symbol::from("name"))));
        assert_eq!(bytes, vec![0x71, 0x04]);
        assert_eq!(system_symbol::SYMBOLS, 7);
    }

    #[test]
    fn annotations_wrap_the_value() {
        let bytes = encode_one(&Element::new(Value::Blob(vec![1])).with_annotations(["name"]));
        assert_eq!(bytes, vec![0xE4, 0x81, 0x84, 0xA1, 0x01]);
    }

    #[test]
    fn struct_fields_use_symbol_ids() {
        let bytes = encode_one(&Element::new(Value::Struct(vec![(
            Symbol::from("name"),
            Element::new(Value::Null(IonType::Null)),
        )])));
        assert_eq!(bytes, vec![0xD2, 0x84, 0x0F]);
    }
}
