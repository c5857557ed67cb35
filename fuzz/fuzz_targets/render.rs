#![no_main]

use std::io;

use ionzst_driver::TextStyle;
use libfuzzer_sys::fuzz_target;

// Ion binary to text on arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    let _ = ionzst_driver::render(data, io::sink(), TextStyle::Lines);
});
