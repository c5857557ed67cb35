#![no_main]

use libfuzzer_sys::fuzz_target;
use ionzst_wire::varint::{decode_var_int, decode_var_uint, encode_var_int, encode_var_uint};

fuzz_target!(|value: (u64, i64)| {
    let (unsigned, signed) = value;

    let mut buf = Vec::new();
    encode_var_uint(unsigned, &mut buf);
    assert_eq!(decode_var_uint(&buf).unwrap(), (unsigned, buf.len()));

    let mut buf = Vec::new();
    encode_var_int(signed, &mut buf);
    assert_eq!(decode_var_int(&buf).unwrap(), (signed, buf.len()));
});
