//! Conformance: a hand-assembled object and the rendered text of every Ion
//! type, pinned with insta inline snapshots.
//!
//! The golden object below is built byte by byte rather than with the
//! encoder, using raw (stored) zstd blocks, so it checks the reader side
//! against the formats themselves.

use ionzst_driver::{PipelineConfig, TextStyle};
use ionzst_tests::{dump_object, dump_text, every_type, object};
use ionzst_types::Element;

/// One zstd frame holding `content` in a single raw block.
///
/// ```text
/// 28 B5 2F FD   magic
/// 20            single segment, 1-byte content size, no checksum
/// len           content size
/// hh hh hh      block header: last block, raw, size = len
/// content...
/// ```
fn raw_zstd_frame(content: &[u8]) -> Vec<u8> {
    let len = u8::try_from(content.len()).unwrap();
    let header = 1u32 | (u32::from(len) << 3);
    let mut frame = vec![0x28, 0xB5, 0x2F, 0xFD, 0x20, len];
    frame.extend_from_slice(&header.to_le_bytes()[..3]);
    frame.extend_from_slice(content);
    frame
}

/// A top-level blob with a `VarUInt` length (bodies of 14 to 127 bytes).
fn blob(body: &[u8]) -> Vec<u8> {
    let len = u8::try_from(body.len()).unwrap();
    assert!((14..128).contains(&len));
    let mut out = vec![0xAE, 0x80 | len];
    out.extend_from_slice(body);
    out
}

/// `{<name>: <n>}` with its own local symbol table.
fn single_field_struct(name: u8, n: u8) -> Vec<u8> {
    vec![
        0xE0, 0x01, 0x00, 0xEA, // version marker
        0xE7, 0x81, 0x83, // $ion_symbol_table::
        0xD4, 0x87, 0xB2, 0x81, name, // {symbols: ["<name>"]}
        0xD3, 0x8A, 0x21, n, // {$10: n}
    ]
}

#[test]
fn golden_object() {
    let mut object = Vec::new();
    object.extend(blob(&raw_zstd_frame(&single_field_struct(b'a', 1))));
    object.extend(blob(&raw_zstd_frame(&single_field_struct(b'b', 2))));
    object.extend_from_slice(&[0, 0, 0, 0]);

    assert_eq!(object.len(), 2 * 27 + 4);
    insta::assert_snapshot!(dump_text(&object).trim_end(), @r"
    {a: 1}
    {b: 2}
    ");
}

#[test]
fn golden_object_with_trailer() {
    let mut object = blob(&raw_zstd_frame(&single_field_struct(b'x', 9)));
    let trailer = b"opaque trailer";
    object.extend_from_slice(trailer);
    object.extend_from_slice(&u32::try_from(trailer.len()).unwrap().to_le_bytes());
    assert_eq!(dump_text(&object), "{x: 9}\n");
}

#[test]
fn every_type_as_lines() {
    let text = dump_text(&object(&[&every_type()]));
    insta::assert_snapshot!(text.trim_end(), @r#"
    null
    null.int
    null.struct
    true
    false
    0
    -42
    -9223372036854775808
    18446744073709551615
    2.5e0
    -0e0
    +inf
    12345d-2
    -7d3
    2024T
    2024-02-29
    2024-05-17T23:30-02:30
    2023-12-31T23:59:59.250+01:00
    2024-01-01T00:00:00-00:00
    plain
    'needs quoting'
    "text with \"quotes\"\n"
    {{"clob\x00"}}
    {{3q2+7w==}}
    [1, "two"]
    ('+' 1 2)
    {nested: {deep: []}, dup: 1, dup: 2}
    unit::ms::7
    "#);
}

#[test]
fn nested_values_pretty() {
    let value = Element::structure([
        ("id", Element::from(7i64)),
        (
            "tags",
            Element::new(ionzst_types::Value::List(vec![Element::from("a"), Element::from("b")])),
        ),
        ("meta", Element::structure([("ok", Element::from(true))])),
    ]);
    let config = PipelineConfig {
        style: TextStyle::Pretty,
        ..PipelineConfig::default()
    };
    let (text, _) = dump_object(&object(&[&[value]]), &config).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r#"
    {
      id: 7,
      tags: [
        "a",
        "b"
      ],
      meta: {
        ok: true
      }
    }
    "#);
}
