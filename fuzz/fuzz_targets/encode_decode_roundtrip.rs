#![no_main]

use ionzst_decoder::BinaryReader;
use ionzst_encoder::binary_writer::encode;
use ionzst_types::{Element, Symbol, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
enum Scalar {
    Int(i64),
    Bool(bool),
    Text(String),
    Symbol(String),
    Blob(Vec<u8>),
}

impl From<Scalar> for Element {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Int(n) => Element::from(n),
            Scalar::Bool(b) => Element::from(b),
            Scalar::Text(s) => Element::from(s.as_str()),
            Scalar::Symbol(s) => Element::new(Value::Symbol(Symbol::from(s))),
            Scalar::Blob(b) => Element::new(Value::Blob(b)),
        }
    }
}

// Encoder output always decodes back to the same values.
fuzz_target!(|records: Vec<Vec<(String, Scalar)>>| {
    let elements: Vec<Element> = records
        .into_iter()
        .map(|fields| {
            Element::new(Value::Struct(
                fields
                    .into_iter()
                    .map(|(name, value)| (Symbol::from(name), Element::from(value)))
                    .collect(),
            ))
        })
        .collect();

    let bytes = encode(&elements).unwrap();
    let mut reader = BinaryReader::new(&bytes[..]);
    for expected in &elements {
        assert_eq!(reader.next_element().unwrap().as_ref(), Some(expected));
    }
    assert_eq!(reader.next_element().unwrap(), None);
});
