//! Tests for script opcode execution
//!
//! Scripts are evaluated end to end through `Script::evaluate_with_config`
//! with the default limits.

use blvm_script_core::config::{NoncePolicy, ScriptConfig};
use blvm_script_core::constants::{MAX_SCRIPT_OPS, MAX_STACK_SIZE};
use blvm_script_core::crypto::hash160;
use blvm_script_core::ecc::secp256k1::s256_point;
use blvm_script_core::ecdsa::{PrivateKey, Signature};
use blvm_script_core::opcodes::*;
use blvm_script_core::script::{encode_num, Command, Script};
use blvm_script_core::{Result, ScriptErrorCode};
use num_bigint::BigUint;

fn from_hex(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap()
}

fn eval_with_z(cmds: Vec<Command>, z: &BigUint) -> Result<bool> {
    Script::new(cmds).evaluate_with_config(z, &ScriptConfig::default())
}

fn eval(cmds: Vec<Command>) -> Result<bool> {
    eval_with_z(cmds, &BigUint::from(0u8))
}

fn ops(bytes: &[u8]) -> Vec<Command> {
    bytes.iter().map(|b| Command::Op(*b)).collect()
}

fn num(n: i64) -> Command {
    Command::Push(encode_num(n))
}

fn failure(result: Result<bool>) -> (ScriptErrorCode, &'static str) {
    let err = result.expect_err("script should fail");
    (
        err.script_error_code().expect("script error"),
        err.failed_opcode().expect("opcode name"),
    )
}

/// Signature with SIGHASH_ALL appended, as it appears on the stack
fn stack_sig(sig: &Signature) -> Vec<u8> {
    let mut bytes = sig.der();
    bytes.push(0x01);
    bytes
}

// ============================================================================
// Signatures
// ============================================================================

#[test]
fn test_p2pk_known_vector() {
    let z = from_hex("7c076ff316692a3d7eb3c3bb0f8b1488cf72e1afcd929e29307032997a838a3d");
    let point = s256_point(
        from_hex("887387e452b8eacc4acfde10d9aaf7f6d9a0f975aabb10d006e4da568744d06c"),
        from_hex("61de6d95231cd89026e286df3b6ae4a894a3378e393e93a0f45b666329a0ae34"),
    )
    .unwrap();
    let sig = Signature::new(
        from_hex("eff69ef2b1bd93a66ed5219add4fb51e11a840f404876325a1e8ffe0529a2c"),
        from_hex("c7207fee197d27c618aea621406f6bf5ef6fca38681d82b2f06fddbdce6feab6"),
    );
    let unlocking = Script::new(vec![Command::Push(stack_sig(&sig))]);
    let locking = Script::new(vec![
        Command::Push(point.sec(false).unwrap()),
        Command::Op(OP_CHECKSIG),
    ]);
    let combined = unlocking.combine(&locking);
    assert!(combined
        .evaluate_with_config(&z, &ScriptConfig::default())
        .unwrap());
    assert!(!combined
        .evaluate_with_config(&(&z + 1u8), &ScriptConfig::default())
        .unwrap());
}

#[test]
fn test_p2pkh_spend() {
    let key = PrivateKey::new(BigUint::from(31337u32)).unwrap();
    let z = from_hex("a6bd4c5cb8a2d3b6a1a8ffe7c1f4e3d2b1a09f8e7d6c5b4a3928171615141312");
    let sec = key.sec(true).unwrap();
    let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();

    let unlocking = Script::new(vec![Command::Push(stack_sig(&sig)), Command::Push(sec.clone())]);
    let locking = Script::p2pkh(&hash160(&sec));
    assert!(unlocking
        .combine(&locking)
        .evaluate_with_config(&z, &ScriptConfig::default())
        .unwrap());

    // right key, wrong hash: CHECKSIG leaves false, no error
    assert!(!unlocking
        .combine(&locking)
        .evaluate_with_config(&BigUint::from(1u8), &ScriptConfig::default())
        .unwrap());

    // one altered byte in r, then in s: still valid DER, CHECKSIG leaves false
    let der = sig.der();
    let r_len = der[3] as usize;
    for index in [3 + r_len, der.len() - 1] {
        let mut tampered = stack_sig(&sig);
        tampered[index] ^= 0x01;
        assert!(Signature::parse_der(&tampered[..tampered.len() - 1]).is_ok());
        let unlocking = Script::new(vec![Command::Push(tampered), Command::Push(sec.clone())]);
        assert!(!unlocking
            .combine(&locking)
            .evaluate_with_config(&z, &ScriptConfig::default())
            .unwrap());
    }

    // wrong key: EQUALVERIFY fails
    let other_sec = PrivateKey::new(BigUint::from(31338u32)).unwrap().sec(true).unwrap();
    let wrong = Script::new(vec![Command::Push(stack_sig(&sig)), Command::Push(other_sec)]);
    let (code, name) = failure(
        wrong
            .combine(&locking)
            .evaluate_with_config(&z, &ScriptConfig::default()),
    );
    assert_eq!(code, ScriptErrorCode::Verify);
    assert_eq!(name, "OP_EQUALVERIFY");
}

#[test]
fn test_checksig_bad_encodings() {
    let z = BigUint::from(1u8);
    let key = PrivateKey::new(BigUint::from(7u8)).unwrap();
    let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();

    let bad_pubkey = vec![
        Command::Push(stack_sig(&sig)),
        Command::Push(vec![0x05; 33]),
        Command::Op(OP_CHECKSIG),
    ];
    assert_eq!(
        failure(eval_with_z(bad_pubkey, &z)),
        (ScriptErrorCode::BadEncoding, "OP_CHECKSIG")
    );

    let bad_sig = vec![
        Command::Push(vec![0x30, 0x01]),
        Command::Push(key.sec(true).unwrap()),
        Command::Op(OP_CHECKSIG),
    ];
    assert_eq!(
        failure(eval_with_z(bad_sig, &z)),
        (ScriptErrorCode::BadEncoding, "OP_CHECKSIG")
    );

    let too_few = vec![Command::Push(key.sec(true).unwrap()), Command::Op(OP_CHECKSIG)];
    assert_eq!(
        failure(eval_with_z(too_few, &z)),
        (ScriptErrorCode::InvalidStackOperation, "OP_CHECKSIG")
    );
}

#[test]
fn test_checksigverify() {
    let z = BigUint::from(99u8);
    let key = PrivateKey::new(BigUint::from(11u8)).unwrap();
    let sig = key.sign_with(&z, NoncePolicy::Deterministic).unwrap();
    let cmds = |z_sig: Vec<u8>| {
        vec![
            Command::Push(z_sig),
            Command::Push(key.sec(false).unwrap()),
            Command::Op(OP_CHECKSIGVERIFY),
            Command::Op(OP_1),
        ]
    };
    assert!(eval_with_z(cmds(stack_sig(&sig)), &z).unwrap());
    assert_eq!(
        failure(eval_with_z(cmds(stack_sig(&sig)), &BigUint::from(98u8))),
        (ScriptErrorCode::Verify, "OP_CHECKSIGVERIFY")
    );
}

#[test]
fn test_checkmultisig_two_of_three() {
    let z = from_hex("deadbeef");
    let keys: Vec<PrivateKey> = [101u32, 202, 303]
        .iter()
        .map(|s| PrivateKey::new(BigUint::from(*s)).unwrap())
        .collect();
    let secs: Vec<Vec<u8>> = keys.iter().map(|k| k.sec(true).unwrap()).collect();
    let sigs: Vec<Vec<u8>> = keys
        .iter()
        .map(|k| stack_sig(&k.sign_with(&z, NoncePolicy::Deterministic).unwrap()))
        .collect();

    let script = |chosen: [usize; 2]| {
        let mut cmds = vec![Command::Op(OP_0)];
        cmds.extend(chosen.iter().map(|i| Command::Push(sigs[*i].clone())));
        cmds.push(Command::Op(OP_2));
        cmds.extend(secs.iter().cloned().map(Command::Push));
        cmds.push(Command::Op(OP_3));
        cmds.push(Command::Op(OP_CHECKMULTISIG));
        cmds
    };

    assert!(eval_with_z(script([0, 1]), &z).unwrap());
    assert!(eval_with_z(script([0, 2]), &z).unwrap());
    assert!(eval_with_z(script([1, 2]), &z).unwrap());
    // signatures out of key order do not match
    assert!(!eval_with_z(script([1, 0]), &z).unwrap());
    assert!(!eval_with_z(script([2, 1]), &z).unwrap());
}

#[test]
fn test_checkmultisig_missing_dummy() {
    let key = PrivateKey::new(BigUint::from(5u8)).unwrap();
    let cmds = vec![
        Command::Op(OP_0),
        Command::Push(key.sec(true).unwrap()),
        Command::Op(OP_1),
        Command::Op(OP_CHECKMULTISIG),
    ];
    assert_eq!(
        failure(eval(cmds)),
        (ScriptErrorCode::InvalidStackOperation, "OP_CHECKMULTISIG")
    );
}

#[test]
fn test_checkmultisig_zero_of_zero() {
    assert!(eval(ops(&[OP_0, OP_0, OP_0, OP_CHECKMULTISIG])).unwrap());
}

// ============================================================================
// Arithmetic, comparison and hashing
// ============================================================================

#[test]
fn test_arithmetic_script() {
    assert!(eval(ops(&[OP_2, OP_3, OP_ADD, OP_5, OP_EQUAL])).unwrap());
    assert!(eval(ops(&[OP_2, OP_3, OP_SUB, OP_1NEGATE, OP_NUMEQUAL])).unwrap());
    assert!(eval(ops(&[OP_16, OP_1ADD, OP_DUP, OP_ADD])).unwrap());
    assert!(eval(ops(&[OP_5, OP_2, OP_7, OP_WITHIN])).unwrap());
    assert!(!eval(ops(&[OP_7, OP_2, OP_7, OP_WITHIN])).unwrap());
    assert!(eval(ops(&[OP_3, OP_9, OP_MIN, OP_3, OP_NUMEQUAL])).unwrap());
    assert!(eval(ops(&[OP_1NEGATE, OP_ABS, OP_1, OP_NUMEQUAL])).unwrap());
}

#[test]
fn test_numeric_overflow() {
    let cmds = vec![Command::Push(vec![0x01, 0x00, 0x00, 0x00, 0x01]), Command::Op(OP_1ADD)];
    assert_eq!(
        failure(eval(cmds)),
        (ScriptErrorCode::NumericOverflow, "OP_1ADD")
    );

    // results may exceed 4 bytes, they just cannot be fed back in
    let cmds = vec![num(i32::MAX as i64), num(i32::MAX as i64), Command::Op(OP_ADD)];
    assert!(eval(cmds).unwrap());
    let cmds = vec![
        num(i32::MAX as i64),
        num(i32::MAX as i64),
        Command::Op(OP_ADD),
        Command::Op(OP_1ADD),
    ];
    assert_eq!(
        failure(eval(cmds)),
        (ScriptErrorCode::NumericOverflow, "OP_1ADD")
    );
}

#[test]
fn test_negative_zero_is_false() {
    assert!(!eval(vec![Command::Push(vec![0x80])]).unwrap());
    assert!(eval(vec![Command::Push(vec![0x80]), Command::Op(OP_NOT)]).unwrap());
}

#[test]
fn test_hash_opcodes() {
    let empty_sha256 = hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855").unwrap();
    let cmds = vec![
        Command::Push(vec![]),
        Command::Op(OP_SHA256),
        Command::Push(empty_sha256),
        Command::Op(OP_EQUAL),
    ];
    assert!(eval(cmds).unwrap());

    // Trailing ops keep the queue from matching the P2SH pattern
    let data = b"hello".to_vec();
    let cmds = vec![
        Command::Push(data.clone()),
        Command::Op(OP_HASH160),
        Command::Push(hash160(&data).to_vec()),
        Command::Op(OP_EQUAL),
        Command::Op(OP_VERIFY),
        Command::Op(OP_1),
    ];
    assert!(eval(cmds).unwrap());

    // Without trailing ops the pushed bytes are redeemed; 0x68 is OP_ENDIF
    let cmds = vec![
        Command::Push(data.clone()),
        Command::Op(OP_HASH160),
        Command::Push(hash160(&data).to_vec()),
        Command::Op(OP_EQUAL),
    ];
    assert_eq!(
        failure(eval(cmds)),
        (ScriptErrorCode::UnbalancedConditional, "OP_ENDIF")
    );

    let cmds = vec![Command::Push(data), Command::Op(OP_SIZE), Command::Op(OP_5), Command::Op(OP_EQUALVERIFY)];
    // the original item remains on the stack and is truthy
    assert!(eval(cmds).unwrap());
}

// ============================================================================
// Control flow and stack
// ============================================================================

#[test]
fn test_verify_and_return() {
    assert!(eval(ops(&[OP_1, OP_VERIFY, OP_1])).unwrap());
    assert_eq!(
        failure(eval(ops(&[OP_0, OP_VERIFY, OP_1]))),
        (ScriptErrorCode::Verify, "OP_VERIFY")
    );
    assert_eq!(
        failure(eval(ops(&[OP_1, OP_RETURN]))),
        (ScriptErrorCode::OpReturn, "OP_RETURN")
    );
}

#[test]
fn test_return_in_unexecuted_branch() {
    assert!(eval(ops(&[OP_0, OP_IF, OP_RETURN, OP_ENDIF, OP_1])).unwrap());
}

#[test]
fn test_disabled_opcodes_fail() {
    for op in [OP_CAT, OP_MUL, OP_2DIV, OP_VER, OP_RESERVED, OP_CHECKLOCKTIMEVERIFY] {
        let (code, name) = failure(eval(ops(&[OP_1, OP_1, op])));
        assert_eq!(code, ScriptErrorCode::BadOpcode);
        assert_eq!(name, opcode_name(op));
    }
}

#[test]
fn test_altstack_round_trip() {
    assert!(eval(ops(&[OP_1, OP_TOALTSTACK, OP_0, OP_DROP, OP_FROMALTSTACK])).unwrap());
    assert_eq!(
        failure(eval(ops(&[OP_FROMALTSTACK]))),
        (ScriptErrorCode::InvalidAltStackOperation, "OP_FROMALTSTACK")
    );
}

#[test]
fn test_depth_and_ifdup() {
    assert!(eval(ops(&[OP_1, OP_1, OP_DEPTH, OP_2, OP_EQUAL])).unwrap());
    assert!(eval(ops(&[OP_0, OP_IFDUP, OP_DEPTH, OP_1, OP_EQUAL])).unwrap());
    assert!(eval(ops(&[OP_3, OP_IFDUP, OP_DEPTH, OP_2, OP_EQUAL])).unwrap());
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_op_count_limit() {
    let mut bytes = vec![OP_1];
    bytes.extend(std::iter::repeat(OP_NOP).take(MAX_SCRIPT_OPS));
    assert!(eval(ops(&bytes)).unwrap());

    bytes.push(OP_NOP);
    assert_eq!(failure(eval(ops(&bytes))), (ScriptErrorCode::OpCount, "OP_NOP"));
}

#[test]
fn test_push_opcodes_not_counted() {
    let mut bytes = vec![OP_1; 10];
    bytes.extend(std::iter::repeat(OP_DROP).take(9));
    bytes.extend(std::iter::repeat(OP_NOP).take(MAX_SCRIPT_OPS - 9));
    assert!(eval(ops(&bytes)).unwrap());
}

#[test]
fn test_stack_size_limit() {
    let fill = vec![OP_1; MAX_STACK_SIZE];
    assert!(eval(ops(&fill)).unwrap());

    let mut overflow = fill;
    overflow.push(OP_1);
    assert_eq!(
        failure(eval(ops(&overflow))),
        (ScriptErrorCode::StackSize, "OP_1")
    );
}

#[test]
fn test_pushdata_counts_toward_stack_size() {
    let mut cmds = ops(&[OP_1; MAX_STACK_SIZE]);
    cmds.push(Command::Push(vec![0xaa]));
    assert_eq!(
        failure(eval(cmds)),
        (ScriptErrorCode::StackSize, "OP_PUSHDATA")
    );
}
