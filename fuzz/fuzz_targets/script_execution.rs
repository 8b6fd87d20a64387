#![no_main]
use blvm_script_core::config::ScriptConfig;
use blvm_script_core::script::Script;
use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;

fuzz_target!(|data: &[u8]| {
    // Script evaluation fuzzing
    // Arbitrary bytes are parsed as a raw command stream and evaluated; every
    // outcome must be a verdict or an error, never a panic.

    if data.is_empty() {
        return;
    }

    // First byte selects limits so small-limit paths get coverage too
    let selector = data[0];
    let body = &data[1..];

    let config = ScriptConfig {
        max_stack_size: if selector & 0x01 != 0 { 16 } else { 1000 },
        max_ops: if selector & 0x02 != 0 { 8 } else { 201 },
        enable_p2sh: selector & 0x04 == 0,
        ..ScriptConfig::default()
    };
    let z = BigUint::from_bytes_be(&body[..body.len().min(32)]);

    let Ok(script) = Script::parse_raw_with_limit(body, config.max_script_size) else {
        return;
    };
    let _result = script.evaluate_with_config(&z, &config);

    // Same commands as the redeem script of a P2SH spend
    if let Ok(redeem) = script.raw_serialize() {
        let locking = Script::p2sh(&blvm_script_core::crypto::hash160(&redeem));
        if let Ok(unlocking) = Script::p2sh_spend(vec![], &script) {
            let _result2 = unlocking.combine(&locking).evaluate_with_config(&z, &config);
        }
    }
});
