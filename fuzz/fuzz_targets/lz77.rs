#![no_main]
use libfuzzer_sys::fuzz_target;

use landstalker_codec::{lz77_decode, lz77_encode};

fuzz_target!(|data: &[u8]| {
    if let Ok((decoded, _)) = lz77_decode(data) {
        let reencoded = lz77_encode(&decoded);
        let (redecoded, _) = lz77_decode(&reencoded).expect("re-encoding a valid decode must decode");
        assert_eq!(redecoded, decoded);
    }
});
