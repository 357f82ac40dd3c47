#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use roadlog_path_validator::PathValidator;

fuzz_target!(|data: &[u8]| {
    if let Ok(validator) = PathValidator::new(84) {
        if let Ok(report) = validator.scan(Cursor::new(data), "fuzz.log") {
            // 위반은 검사한 경로에서만 나옴
            assert!(report.violations.len() <= report.paths_scanned);
        }
    }
});
