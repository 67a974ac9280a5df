#![no_main]

use benchstat::clean::clean_log;
use benchstat::record::{CoveragePoint, RunName};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Every line the cleaner keeps must parse again
    let cleaned = clean_log(&text);
    for line in &cleaned.lines {
        assert!(CoveragePoint::parse_line(line).is_ok());
    }

    let _ = RunName::parse(&text);
});
