#![no_main]
use libfuzzer_sys::fuzz_target;

use landstalker_codec::tilemap3d_decode;

fuzz_target!(|data: &[u8]| {
    let _ = tilemap3d_decode(data);
});
