#![no_main]

use libfuzzer_sys::fuzz_target;
use superfacturas::core::ParserConfig;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    // Errors are fine, panics are bugs.
    let _ = superfacturas::dian::parse_str(&s, "fuzz.xml", &ParserConfig::default());
    let strict = ParserConfig { recover: false, ..ParserConfig::default() };
    let _ = superfacturas::dian::parse_str(&s, "fuzz.xml", &strict);
});
