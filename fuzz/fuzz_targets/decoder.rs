#![no_main]

use libfuzzer_sys::fuzz_target;
use x86scope::x86::{Decoder, DecoderConfig};

fuzz_target!(|data: &[u8]| {
    // First byte picks the refill chunk size so short reads get exercised too.
    let Some((&chunk, code)) = data.split_first() else {
        return;
    };

    let config = DecoderConfig::new().with_chunk_size(usize::from(chunk % 32));
    let mut decoder = Decoder::with_config(code, &config);
    while let Ok(Some(decoded)) = decoder.decode_next() {
        assert!(decoded.length >= 1 && decoded.length <= 15);
        let _ = decoded.branch_target();
    }
});
