#![no_main]

use ionzst_decoder::BinaryReader;
use libfuzzer_sys::fuzz_target;

// Element decoding on arbitrary bytes: descriptors, lengths, symbol
// tables, timestamps, nesting. Must return an error, never panic.
fuzz_target!(|data: &[u8]| {
    let mut reader = BinaryReader::new(data);
    while let Ok(Some(_)) = reader.next_element() {}
});
