#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use ber2der::{Options, Transcoder};

fuzz_target!(|data: &[u8]| {
    let transcoder = Transcoder::new(Options::der());
    if let Ok(der) = transcoder.canonicalize(Bytes::copy_from_slice(data)) {
        // Whatever we accept must produce an acceptable encoding.
        assert!(transcoder.canonicalize(der).is_ok());
    }
});
