#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Tokens become argv; the block size token is the interesting part.
    let args: Vec<String> = String::from_utf8_lossy(data)
        .split_whitespace()
        .take(16)
        .map(str::to_owned)
        .collect();
    blockdelta::cli::fuzz_try_parse_args(&args);
});
