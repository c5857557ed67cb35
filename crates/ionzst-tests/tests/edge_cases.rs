//! Malformed and unusual objects: each one either dumps the values before
//! the damage or fails with the error of the stage that found it.

use std::io::{self, Read};

use ionzst_decoder::DecodeError;
use ionzst_driver::{DriverError, Pipeline, PipelineConfig, PipelineError};
use ionzst_encoder::EnvelopeBuilder;
use ionzst_encoder::compression::compress_frame;
use ionzst_tests::{dump_object, dump_text, log_records};
use ionzst_types::{Decimal, Element, IonType, Timestamp, Value};

fn config() -> PipelineConfig {
    PipelineConfig::default()
}

fn frame(values: &[Element]) -> Vec<u8> {
    let ion = ionzst_encoder::binary_writer::encode(values).unwrap();
    compress_frame(&ion, 3).unwrap()
}

#[test]
fn string_in_envelope_is_rejected() {
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(&frame(&[Element::from(1i64)]));
    builder.add_value(&Element::from("not a blob")).unwrap();
    let object = builder.build().unwrap();

    match dump_object(&object, &config()) {
        Err(PipelineError::Extract(DecodeError::UnexpectedType { expected, found, .. })) => {
            assert_eq!(expected, IonType::Blob);
            assert_eq!(found, IonType::String);
        }
        other => panic!("expected an extract failure, got {other:?}"),
    }
}

#[test]
fn null_and_annotated_blobs_are_accepted() {
    let mut builder = EnvelopeBuilder::new();
    builder
        .add_value(&Element::new(Value::Null(IonType::Blob)))
        .unwrap()
        .add_value(&Element::new(Value::Blob(frame(&[Element::from(1i64)]))).with_annotations(["chunk"]))
        .unwrap()
        .add_blob(&[])
        .add_blob(&frame(&[Element::from(2i64)]));
    let object = builder.build().unwrap();
    assert_eq!(dump_text(&object), "1\n2\n");
}

#[test]
fn zstd_frame_split_across_blobs() {
    let whole = frame(&log_records(20));
    let (head, tail) = whole.split_at(whole.len() / 2);
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(head).add_blob(tail);
    let object = builder.build().unwrap();
    assert_eq!(dump_text(&object).lines().count(), 20);
}

#[test]
fn nop_padding_between_blobs() {
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(&frame(&[Element::from(1i64)]));
    let mut object = builder.build_with_trailer(&[]).unwrap();
    // replace the empty trailer with a NOP pad plus a second blob
    object.truncate(object.len() - 4);
    object.extend_from_slice(&[0x03, 0x00, 0x00, 0x00]);
    let second = frame(&[Element::from(2i64)]);
    let mut tail = EnvelopeBuilder::new();
    tail.add_blob(&second);
    let tail = tail.build_with_trailer(&[]).unwrap();
    object.extend_from_slice(&tail);
    assert_eq!(dump_text(&object), "1\n2\n");
}

#[test]
fn truncated_zstd_frame() {
    let whole = frame(&log_records(20));
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(&whole[..whole.len() - 3]);
    let object = builder.build().unwrap();
    assert!(matches!(
        dump_object(&object, &config()),
        Err(PipelineError::Decompress(DecodeError::DecompressFailed(_)))
    ));
}

#[test]
fn truncated_blob_in_payload() {
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(&frame(&[Element::from(1i64)]));
    let mut object = builder.build_with_trailer(&[]).unwrap();
    // drop the last payload byte and fix up the empty trailer
    object.truncate(object.len() - 5);
    object.extend_from_slice(&[0, 0, 0, 0]);
    assert!(matches!(
        dump_object(&object, &config()),
        Err(PipelineError::Extract(DecodeError::UnexpectedEof { .. }))
    ));
}

#[test]
fn ion_stream_without_marker_fails_in_render() {
    let mut ion = ionzst_encoder::BinaryWriter::without_marker();
    ion.write(&Element::from(1i64)).unwrap();
    let frame = compress_frame(&ion.finish().unwrap(), 3).unwrap();
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(&frame);
    assert!(matches!(
        dump_object(&builder.build().unwrap(), &config()),
        Err(PipelineError::Render(DriverError::Decode(DecodeError::MissingMarker)))
    ));
}

#[test]
fn truncated_ion_value_keeps_earlier_output() {
    let mut ion = ionzst_encoder::binary_writer::encode(&[Element::from(1i64), Element::from("long enough")]).unwrap();
    ion.truncate(ion.len() - 2);
    let mut builder = EnvelopeBuilder::new();
    builder.add_blob(&compress_frame(&ion, 3).unwrap());

    let mut out = Vec::new();
    let err = ionzst_driver::dump(
        &ionzst_driver::MemorySource::new(builder.build().unwrap()),
        &mut out,
        &config(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Render(DriverError::Decode(DecodeError::UnexpectedEof { .. }))
    ));
    assert_eq!(String::from_utf8(out).unwrap(), "1\n");
}

/// Stalls until the pipeline is cancelled from outside.
struct StalledSource {
    token: ionzst_driver::CancelToken,
}

impl Read for StalledSource {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        while !self.token.is_cancelled() {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "source stalled"))
    }
}

#[test]
fn cancellation_from_another_thread() {
    let pipeline = Pipeline::new(config());
    let token = pipeline.cancel_token();
    let source = StalledSource {
        token: token.clone(),
    };
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        token.cancel();
    });
    let err = pipeline.run(source, io::sink()).unwrap_err();
    canceller.join().unwrap();
    assert!(matches!(err, PipelineError::Cancelled));
}

#[test]
fn timestamp_with_very_long_fraction_renders() {
    let ts = Timestamp::date(2024, 1, 1)
        .unwrap()
        .at_second(0, 0, 0, Some(0))
        .unwrap()
        .with_fraction(Decimal::new(0i64, -70_000))
        .unwrap();
    let object = ionzst_tests::object(&[&[Element::new(Value::Timestamp(ts)), Element::from(1i64)]]);

    let text = dump_text(&object);
    let (timestamp, rest) = text.split_once('\n').unwrap();
    assert_eq!(timestamp.len(), "2024-01-01T00:00:00.".len() + 70_000 + "Z".len());
    assert_eq!(rest, "1\n");
}
