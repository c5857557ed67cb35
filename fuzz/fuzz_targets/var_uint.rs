#![no_main]

use libfuzzer_sys::fuzz_target;

// VarUInt/VarInt decoding on arbitrary bytes: overflow past 64 bits,
// missing end bit, empty input.
fuzz_target!(|data: &[u8]| {
    let _ = ionzst_wire::varint::decode_var_uint(data);
    let _ = ionzst_wire::varint::decode_var_int(data);
});
