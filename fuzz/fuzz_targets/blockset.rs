#![no_main]
use libfuzzer_sys::fuzz_target;

use landstalker_codec::blockset_decode;

fuzz_target!(|data: &[u8]| {
    let _ = blockset_decode(data);
});
