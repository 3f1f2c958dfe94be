//! Structured fuzzing for the domain handlers.
//!
//! Builds URLs from a registered scheme plus arbitrary components so the
//! handlers see inputs that get past scheme lookup.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_handlers
//! ```

#![no_main]

use arbitrary::Arbitrary;
use envurl_core::{Domain, HandlerOptions, registry};
use libfuzzer_sys::fuzz_target;

/// A generated URL for one domain.
#[derive(Debug, Arbitrary)]
struct FuzzUrl {
    domain: u8,
    scheme: u8,
    userinfo: Option<String>,
    hosts: Vec<String>,
    path: String,
    query: Vec<(String, String)>,
    backend: Option<String>,
}

impl FuzzUrl {
    fn render(&self, scheme: &str) -> String {
        let mut url = format!("{}://", scheme);
        if let Some(userinfo) = &self.userinfo {
            url.push_str(userinfo);
            url.push('@');
        }
        url.push_str(&self.hosts.join(","));
        url.push('/');
        url.push_str(&self.path);
        if !self.query.is_empty() {
            let pairs: Vec<String> = self.query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

fuzz_target!(|input: FuzzUrl| {
    let domain = Domain::ALL[input.domain as usize % Domain::ALL.len()];
    let Ok(handler) = registry().for_domain(domain) else {
        return;
    };
    let schemes = handler.schemes();
    if schemes.is_empty() {
        return;
    }
    let entry = schemes[input.scheme as usize % schemes.len()];

    let mut opts = HandlerOptions::new();
    if let Some(backend) = &input.backend {
        opts = opts.with_backend(backend.as_str());
    }

    // errors are fine, panics are not
    let _ = handler.get_backend(&input.render(entry.scheme), &opts);
});
