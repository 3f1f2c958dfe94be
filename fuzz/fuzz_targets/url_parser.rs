//! Fuzz target for the URL normalizer.
//!
//! Arbitrary strings must either fail with an error or parse into a URL whose
//! rendered form keeps its scheme.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_url_parser
//! ```

#![no_main]

use envurl_core::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(url) = parse(input) else {
        return;
    };

    if let Ok(again) = parse(&url.to_url()) {
        assert_eq!(url.scheme, again.scheme);
    }
});
