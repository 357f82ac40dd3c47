#![no_main]

use libfuzzer_sys::fuzz_target;
use roadlog_correlator::ConfigDocument;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        let _ = ConfigDocument::parse(xml);
    }
});
