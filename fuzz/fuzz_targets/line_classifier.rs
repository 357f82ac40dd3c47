#![no_main]

use libfuzzer_sys::fuzz_target;
use roadlog_core::types::SchemaDescriptor;
use roadlog_correlator::LineClassifier;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        if let Ok(classifier) = LineClassifier::new(&SchemaDescriptor::full()) {
            let _ = classifier.classify(line);
        }
    }
});
