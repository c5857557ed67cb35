#![no_main]

use std::io::Read;

use ionzst_wire::{ION_MARKER, MarkerReader};
use libfuzzer_sys::fuzz_target;

// Any sequence of read sizes yields the marker followed by the source.
fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (source, sizes) = input;
    let mut reader = MarkerReader::new(&source[..]);
    let mut out = Vec::new();
    let mut sizes = sizes.into_iter().map(|s| usize::from(s % 32) + 1).cycle();
    loop {
        let mut buf = vec![0u8; sizes.next().unwrap_or(8)];
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    assert_eq!(&out[..4], &ION_MARKER);
    assert_eq!(&out[4..], &source[..]);
});
