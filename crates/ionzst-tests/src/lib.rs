//! Fixtures shared by the integration tests and benches.
//!
//! Objects are built in memory with [`EnvelopeBuilder`], so every fixture
//! is deterministic and nothing is read from disk.

use ionzst_driver::{MemorySource, PipelineConfig, PipelineError, PipelineReport, dump};
use ionzst_encoder::EnvelopeBuilder;
use ionzst_types::{Decimal, Element, IonType, Symbol, Timestamp, Value};

/// Build an `ion.zst` object with one compressed blob per chunk and the
/// default trailer.
///
/// # Panics
///
/// If a record cannot be encoded.
pub fn object(chunks: &[&[Element]]) -> Vec<u8> {
    let mut builder = EnvelopeBuilder::new();
    for chunk in chunks {
        builder
            .add_chunk(chunk)
            .unwrap_or_else(|e| panic!("encoding fixture chunk failed: {e}"));
    }
    builder
        .build()
        .unwrap_or_else(|e| panic!("building fixture object failed: {e}"))
}

/// Dump `object` and return the text together with the run report.
///
/// # Errors
///
/// Whatever the pipeline reports.
///
/// # Panics
///
/// If the rendered text is not UTF-8.
pub fn dump_object(object: &[u8], config: &PipelineConfig) -> Result<(String, PipelineReport), PipelineError> {
    let mut out = Vec::new();
    let report = dump(&MemorySource::new(object.to_vec()), &mut out, config)?;
    let text = String::from_utf8(out).unwrap_or_else(|e| panic!("rendered text is not UTF-8: {e}"));
    Ok((text, report))
}

/// Dump with the default configuration, panicking on failure.
///
/// # Panics
///
/// If the pipeline fails.
pub fn dump_text(object: &[u8]) -> String {
    dump_object(object, &PipelineConfig::default())
        .unwrap_or_else(|e| panic!("dump failed: {e}"))
        .0
}

/// `n` log-like records: a sequence number, a host symbol out of a small
/// set, a status code and a message string.
pub fn log_records(n: usize) -> Vec<Element> {
    const HOSTS: [&str; 4] = ["web-1", "web-2", "db", "cache"];
    (0..n)
        .map(|i| {
            let seq = i64::try_from(i).unwrap_or(i64::MAX);
            Element::structure([
                ("seq", Element::from(seq)),
                ("host", Element::new(Value::Symbol(Symbol::from(HOSTS[i % HOSTS.len()])))),
                ("status", Element::from(if i % 7 == 0 { 500i64 } else { 200i64 })),
                ("msg", Element::from(format!("request {i} served").as_str())),
            ])
        })
        .collect()
}

/// One value of every Ion type, typed nulls and annotations included.
/// Float NaN is left out so the list compares equal to itself.
///
/// # Panics
///
/// Never; the timestamps are valid.
pub fn every_type() -> Vec<Element> {
    let ts = |t: Result<Timestamp, _>| Element::from(t.unwrap_or_else(|e| panic!("{e}")));
    vec![
        Element::new(Value::Null(IonType::Null)),
        Element::new(Value::Null(IonType::Int)),
        Element::new(Value::Null(IonType::Struct)),
        Element::from(true),
        Element::from(false),
        Element::from(0i64),
        Element::from(-42i64),
        Element::from(i64::MIN),
        Element::new(Value::Int(u64::MAX.into())),
        Element::from(2.5f64),
        Element::from(-0.0f64),
        Element::from(f64::INFINITY),
        Element::from(Decimal::new(12345i64, -2)),
        Element::from(Decimal::new(-7i64, 3)),
        ts(Timestamp::year(2024)),
        ts(Timestamp::date(2024, 2, 29)),
        ts(Timestamp::date(2024, 5, 17).and_then(|t| t.at_minute(23, 30, Some(-150)))),
        ts(Timestamp::date(2023, 12, 31)
            .and_then(|t| t.at_second(23, 59, 59, Some(60)))
            .and_then(|t| t.with_fraction(Decimal::new(250i64, -3)))),
        ts(Timestamp::date(2024, 1, 1).and_then(|t| t.at_second(0, 0, 0, None))),
        Element::new(Value::Symbol(Symbol::from("plain"))),
        Element::new(Value::Symbol(Symbol::from("needs quoting"))),
        Element::from("text with \"quotes\"\n"),
        Element::new(Value::Clob(b"clob\x00".to_vec())),
        Element::new(Value::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF])),
        Element::new(Value::List(vec![Element::from(1i64), Element::from("two")])),
        Element::new(Value::SExp(vec![
            Element::new(Value::Symbol(Symbol::from("+"))),
            Element::from(1i64),
            Element::from(2i64),
        ])),
        Element::structure([
            ("nested", Element::structure([("deep", Element::new(Value::List(vec![])))])),
            ("dup", Element::from(1i64)),
            ("dup", Element::from(2i64)),
        ]),
        Element::from(7i64).with_annotations(["unit", "ms"]),
    ]
}
