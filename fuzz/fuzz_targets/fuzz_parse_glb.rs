#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the container parsing pipeline: chunk framing -> JSON descriptor
    // -> data URI decoding. Must never panic on arbitrary bytes.
    if let Ok(doc) = glbedit::Document::from_bytes(data) {
        // Serialization of a parsed document must be a fixed point: the
        // output parses again and reproduces itself byte-identically.
        let out = doc.to_bytes().unwrap();
        let again = glbedit::Document::from_bytes(&out).unwrap();
        assert_eq!(again.to_bytes().unwrap(), out);
    }
});
