#![no_main]

use std::io;

use ionzst_wire::MarkerReader;
use libfuzzer_sys::fuzz_target;

// Envelope unwrapping on an arbitrary payload, marker supplied as in
// the pipeline.
fuzz_target!(|data: &[u8]| {
    let _ = ionzst_decoder::extract(MarkerReader::new(data), io::sink());
});
