#![no_main]
use blvm_script_core::script::Script;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Length-prefixed script parsing
    // Serialization is canonical: whatever parses serializes to bytes that
    // parse and serialize to themselves, unless a push exceeds the
    // serializable element size.

    let Ok((script, consumed)) = Script::parse(data) else {
        return;
    };
    assert!(consumed <= data.len());

    if let Ok(serialized) = script.serialize() {
        // An empty push comes back as OP_0, so compare bytes rather than commands
        let (reparsed, _) = Script::parse(&serialized).expect("serialized script parses");
        assert_eq!(reparsed.serialize().ok().as_deref(), Some(&serialized[..]));
    }
});
