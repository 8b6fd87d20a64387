//! Opcode semantics
//!
//! [`instruction`] maps an opcode byte to an [`Instruction`], a function
//! pointer tagged with the state it needs. Handlers report failure as a
//! [`ScriptErrorCode`]; the interpreter attaches the opcode name.

use super::num::{cast_to_bool, decode_num, encode_num};
use super::Command;
use crate::constants::{MAX_NUM_SIZE, MAX_PUBKEYS_PER_MULTISIG};
use crate::crypto::{hash160, hash256, ripemd160, sha1, sha256};
use crate::ecc::point::Point;
use crate::ecdsa::{verify, Signature};
use crate::error::ScriptErrorCode;
use crate::opcodes::*;
use crate::types::{ByteString, Stack};
use log::debug;
use num_bigint::BigUint;
use std::collections::VecDeque;

pub type OpResult = std::result::Result<(), ScriptErrorCode>;

/// An executable opcode and the state it touches.
#[derive(Clone, Copy)]
pub enum Instruction {
    /// Main stack only
    Stack(fn(&mut Stack) -> OpResult),
    /// Main stack plus the pending command queue (`OP_IF`, `OP_NOTIF`)
    Conditional(fn(&mut Stack, &mut VecDeque<Command>) -> OpResult),
    /// Main and alt stacks
    AltStack(fn(&mut Stack, &mut Stack) -> OpResult),
    /// Main stack plus the signature hash
    Signature(fn(&mut Stack, &BigUint) -> OpResult),
}

/// `None` for disabled, reserved and unknown opcodes.
pub fn instruction(op: u8) -> Option<Instruction> {
    use Instruction as I;

    let inst = match op {
        OP_0 => I::Stack(op_push_num::<0>),
        OP_1NEGATE => I::Stack(op_push_num::<{ -1 }>),
        OP_1 => I::Stack(op_push_num::<1>),
        OP_2 => I::Stack(op_push_num::<2>),
        OP_3 => I::Stack(op_push_num::<3>),
        OP_4 => I::Stack(op_push_num::<4>),
        OP_5 => I::Stack(op_push_num::<5>),
        OP_6 => I::Stack(op_push_num::<6>),
        OP_7 => I::Stack(op_push_num::<7>),
        OP_8 => I::Stack(op_push_num::<8>),
        OP_9 => I::Stack(op_push_num::<9>),
        OP_10 => I::Stack(op_push_num::<10>),
        OP_11 => I::Stack(op_push_num::<11>),
        OP_12 => I::Stack(op_push_num::<12>),
        OP_13 => I::Stack(op_push_num::<13>),
        OP_14 => I::Stack(op_push_num::<14>),
        OP_15 => I::Stack(op_push_num::<15>),
        OP_16 => I::Stack(op_push_num::<16>),

        OP_NOP | OP_NOP1 | OP_NOP4..=OP_NOP10 | OP_CODESEPARATOR => I::Stack(op_nop),
        OP_IF => I::Conditional(op_if),
        OP_NOTIF => I::Conditional(op_notif),
        OP_ELSE | OP_ENDIF => I::Stack(op_unbalanced),
        OP_VERIFY => I::Stack(op_verify),
        OP_RETURN => I::Stack(op_return),

        OP_TOALTSTACK => I::AltStack(op_toaltstack),
        OP_FROMALTSTACK => I::AltStack(op_fromaltstack),
        OP_2DROP => I::Stack(op_2drop),
        OP_2DUP => I::Stack(op_2dup),
        OP_3DUP => I::Stack(op_3dup),
        OP_2OVER => I::Stack(op_2over),
        OP_2ROT => I::Stack(op_2rot),
        OP_2SWAP => I::Stack(op_2swap),
        OP_IFDUP => I::Stack(op_ifdup),
        OP_DEPTH => I::Stack(op_depth),
        OP_DROP => I::Stack(op_drop),
        OP_DUP => I::Stack(op_dup),
        OP_NIP => I::Stack(op_nip),
        OP_OVER => I::Stack(op_over),
        OP_PICK => I::Stack(op_pick),
        OP_ROLL => I::Stack(op_roll),
        OP_ROT => I::Stack(op_rot),
        OP_SWAP => I::Stack(op_swap),
        OP_TUCK => I::Stack(op_tuck),
        OP_SIZE => I::Stack(op_size),

        OP_EQUAL => I::Stack(op_equal),
        OP_EQUALVERIFY => I::Stack(op_equalverify),

        OP_1ADD => I::Stack(op_1add),
        OP_1SUB => I::Stack(op_1sub),
        OP_NEGATE => I::Stack(op_negate),
        OP_ABS => I::Stack(op_abs),
        OP_NOT => I::Stack(op_not),
        OP_0NOTEQUAL => I::Stack(op_0notequal),
        OP_ADD => I::Stack(op_add),
        OP_SUB => I::Stack(op_sub),
        OP_BOOLAND => I::Stack(op_booland),
        OP_BOOLOR => I::Stack(op_boolor),
        OP_NUMEQUAL => I::Stack(op_numequal),
        OP_NUMEQUALVERIFY => I::Stack(op_numequalverify),
        OP_NUMNOTEQUAL => I::Stack(op_numnotequal),
        OP_LESSTHAN => I::Stack(op_lessthan),
        OP_GREATERTHAN => I::Stack(op_greaterthan),
        OP_LESSTHANOREQUAL => I::Stack(op_lessthanorequal),
        OP_GREATERTHANOREQUAL => I::Stack(op_greaterthanorequal),
        OP_MIN => I::Stack(op_min),
        OP_MAX => I::Stack(op_max),
        OP_WITHIN => I::Stack(op_within),

        OP_RIPEMD160 => I::Stack(op_ripemd160),
        OP_SHA1 => I::Stack(op_sha1),
        OP_SHA256 => I::Stack(op_sha256),
        OP_HASH160 => I::Stack(op_hash160),
        OP_HASH256 => I::Stack(op_hash256),

        OP_CHECKSIG => I::Signature(op_checksig),
        OP_CHECKSIGVERIFY => I::Signature(op_checksigverify),
        OP_CHECKMULTISIG => I::Signature(op_checkmultisig),
        OP_CHECKMULTISIGVERIFY => I::Signature(op_checkmultisigverify),

        _ => return None,
    };
    Some(inst)
}

// ============================================================================
// Helpers
// ============================================================================

fn pop(stack: &mut Stack) -> std::result::Result<ByteString, ScriptErrorCode> {
    stack.pop().ok_or(ScriptErrorCode::InvalidStackOperation)
}

fn require(stack: &Stack, n: usize) -> OpResult {
    if stack.len() < n {
        return Err(ScriptErrorCode::InvalidStackOperation);
    }
    Ok(())
}

/// Pop a numeric operand of at most 4 bytes.
fn pop_num(stack: &mut Stack) -> std::result::Result<i64, ScriptErrorCode> {
    let item = pop(stack)?;
    if item.len() > MAX_NUM_SIZE {
        return Err(ScriptErrorCode::NumericOverflow);
    }
    decode_num(&item).ok_or(ScriptErrorCode::NumericOverflow)
}

fn push_bool(stack: &mut Stack, value: bool) {
    stack.push(encode_num(value as i64));
}

// ============================================================================
// Constants and flow control
// ============================================================================

fn op_push_num<const N: i64>(stack: &mut Stack) -> OpResult {
    stack.push(encode_num(N));
    Ok(())
}

fn op_nop(_stack: &mut Stack) -> OpResult {
    Ok(())
}

fn op_unbalanced(_stack: &mut Stack) -> OpResult {
    Err(ScriptErrorCode::UnbalancedConditional)
}

fn op_return(_stack: &mut Stack) -> OpResult {
    Err(ScriptErrorCode::OpReturn)
}

fn op_verify(stack: &mut Stack) -> OpResult {
    let top = pop(stack)?;
    if !cast_to_bool(&top) {
        return Err(ScriptErrorCode::Verify);
    }
    Ok(())
}

/// Split the queue at the `OP_ENDIF` matching an already-consumed `OP_IF`/`OP_NOTIF`.
///
/// Returns the commands of the first and second branch and leaves the queue
/// holding whatever followed `OP_ENDIF`. Each `OP_ELSE` at the outer level
/// switches the branch being collected.
fn split_branches(
    cmds: &mut VecDeque<Command>,
) -> std::result::Result<(Vec<Command>, Vec<Command>), ScriptErrorCode> {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut in_first = true;
    let mut depth = 0usize;

    while let Some(cmd) = cmds.pop_front() {
        match cmd {
            Command::Op(OP_IF | OP_NOTIF) => depth += 1,
            Command::Op(OP_ELSE) if depth == 0 => {
                in_first = !in_first;
                continue;
            }
            Command::Op(OP_ENDIF) if depth == 0 => return Ok((first, second)),
            Command::Op(OP_ENDIF) => depth -= 1,
            _ => {}
        }
        if in_first {
            first.push(cmd);
        } else {
            second.push(cmd);
        }
    }
    Err(ScriptErrorCode::UnbalancedConditional)
}

fn run_branch(stack: &mut Stack, cmds: &mut VecDeque<Command>, negate: bool) -> OpResult {
    let condition = pop(stack)?;
    let (first, second) = split_branches(cmds)?;
    let chosen = if cast_to_bool(&condition) != negate {
        first
    } else {
        second
    };
    for cmd in chosen.into_iter().rev() {
        cmds.push_front(cmd);
    }
    Ok(())
}

fn op_if(stack: &mut Stack, cmds: &mut VecDeque<Command>) -> OpResult {
    run_branch(stack, cmds, false)
}

fn op_notif(stack: &mut Stack, cmds: &mut VecDeque<Command>) -> OpResult {
    run_branch(stack, cmds, true)
}

// ============================================================================
// Stack manipulation
// ============================================================================

fn op_toaltstack(stack: &mut Stack, altstack: &mut Stack) -> OpResult {
    altstack.push(pop(stack)?);
    Ok(())
}

fn op_fromaltstack(stack: &mut Stack, altstack: &mut Stack) -> OpResult {
    let item = altstack
        .pop()
        .ok_or(ScriptErrorCode::InvalidAltStackOperation)?;
    stack.push(item);
    Ok(())
}

fn op_2drop(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    stack.truncate(stack.len() - 2);
    Ok(())
}

fn op_2dup(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    let len = stack.len();
    stack.extend_from_within(len - 2..);
    Ok(())
}

fn op_3dup(stack: &mut Stack) -> OpResult {
    require(stack, 3)?;
    let len = stack.len();
    stack.extend_from_within(len - 3..);
    Ok(())
}

fn op_2over(stack: &mut Stack) -> OpResult {
    require(stack, 4)?;
    let len = stack.len();
    stack.extend_from_within(len - 4..len - 2);
    Ok(())
}

fn op_2rot(stack: &mut Stack) -> OpResult {
    require(stack, 6)?;
    let len = stack.len();
    stack[len - 6..].rotate_left(2);
    Ok(())
}

fn op_2swap(stack: &mut Stack) -> OpResult {
    require(stack, 4)?;
    let len = stack.len();
    stack[len - 4..].rotate_left(2);
    Ok(())
}

fn op_ifdup(stack: &mut Stack) -> OpResult {
    let top = stack.last().ok_or(ScriptErrorCode::InvalidStackOperation)?;
    if cast_to_bool(top) {
        let copy = top.clone();
        stack.push(copy);
    }
    Ok(())
}

fn op_depth(stack: &mut Stack) -> OpResult {
    stack.push(encode_num(stack.len() as i64));
    Ok(())
}

fn op_drop(stack: &mut Stack) -> OpResult {
    pop(stack)?;
    Ok(())
}

fn op_dup(stack: &mut Stack) -> OpResult {
    let top = stack
        .last()
        .cloned()
        .ok_or(ScriptErrorCode::InvalidStackOperation)?;
    stack.push(top);
    Ok(())
}

fn op_nip(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    let len = stack.len();
    stack.remove(len - 2);
    Ok(())
}

fn op_over(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    let item = stack[stack.len() - 2].clone();
    stack.push(item);
    Ok(())
}

/// Index counted from the top for `OP_PICK`/`OP_ROLL`.
fn pop_depth_index(stack: &mut Stack) -> std::result::Result<usize, ScriptErrorCode> {
    let n = pop_num(stack)?;
    if n < 0 || n as usize >= stack.len() {
        return Err(ScriptErrorCode::InvalidStackOperation);
    }
    Ok(stack.len() - 1 - n as usize)
}

fn op_pick(stack: &mut Stack) -> OpResult {
    let index = pop_depth_index(stack)?;
    let item = stack[index].clone();
    stack.push(item);
    Ok(())
}

fn op_roll(stack: &mut Stack) -> OpResult {
    let index = pop_depth_index(stack)?;
    let item = stack.remove(index);
    stack.push(item);
    Ok(())
}

fn op_rot(stack: &mut Stack) -> OpResult {
    require(stack, 3)?;
    let len = stack.len();
    stack[len - 3..].rotate_left(1);
    Ok(())
}

fn op_swap(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    let len = stack.len();
    stack.swap(len - 1, len - 2);
    Ok(())
}

fn op_tuck(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    let len = stack.len();
    let top = stack[len - 1].clone();
    stack.insert(len - 2, top);
    Ok(())
}

fn op_size(stack: &mut Stack) -> OpResult {
    let len = stack
        .last()
        .map(Vec::len)
        .ok_or(ScriptErrorCode::InvalidStackOperation)?;
    stack.push(encode_num(len as i64));
    Ok(())
}

// ============================================================================
// Equality
// ============================================================================

fn op_equal(stack: &mut Stack) -> OpResult {
    require(stack, 2)?;
    let a = pop(stack)?;
    let b = pop(stack)?;
    push_bool(stack, a == b);
    Ok(())
}

fn op_equalverify(stack: &mut Stack) -> OpResult {
    op_equal(stack)?;
    op_verify(stack)
}

// ============================================================================
// Arithmetic
// ============================================================================

fn unary(stack: &mut Stack, f: fn(i64) -> i64) -> OpResult {
    let a = pop_num(stack)?;
    stack.push(encode_num(f(a)));
    Ok(())
}

/// Pops `b` (top) then `a` and pushes `f(a, b)`.
fn binary(stack: &mut Stack, f: fn(i64, i64) -> i64) -> OpResult {
    require(stack, 2)?;
    let b = pop_num(stack)?;
    let a = pop_num(stack)?;
    stack.push(encode_num(f(a, b)));
    Ok(())
}

fn op_1add(stack: &mut Stack) -> OpResult {
    unary(stack, |a| a + 1)
}

fn op_1sub(stack: &mut Stack) -> OpResult {
    unary(stack, |a| a - 1)
}

fn op_negate(stack: &mut Stack) -> OpResult {
    unary(stack, |a| -a)
}

fn op_abs(stack: &mut Stack) -> OpResult {
    unary(stack, i64::abs)
}

fn op_not(stack: &mut Stack) -> OpResult {
    unary(stack, |a| (a == 0) as i64)
}

fn op_0notequal(stack: &mut Stack) -> OpResult {
    unary(stack, |a| (a != 0) as i64)
}

fn op_add(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| a + b)
}

fn op_sub(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| a - b)
}

fn op_booland(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a != 0 && b != 0) as i64)
}

fn op_boolor(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a != 0 || b != 0) as i64)
}

fn op_numequal(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a == b) as i64)
}

fn op_numequalverify(stack: &mut Stack) -> OpResult {
    op_numequal(stack)?;
    op_verify(stack)
}

fn op_numnotequal(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a != b) as i64)
}

fn op_lessthan(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a < b) as i64)
}

fn op_greaterthan(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a > b) as i64)
}

fn op_lessthanorequal(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a <= b) as i64)
}

fn op_greaterthanorequal(stack: &mut Stack) -> OpResult {
    binary(stack, |a, b| (a >= b) as i64)
}

fn op_min(stack: &mut Stack) -> OpResult {
    binary(stack, i64::min)
}

fn op_max(stack: &mut Stack) -> OpResult {
    binary(stack, i64::max)
}

/// x min max -> (min <= x < max)
fn op_within(stack: &mut Stack) -> OpResult {
    require(stack, 3)?;
    let max = pop_num(stack)?;
    let min = pop_num(stack)?;
    let x = pop_num(stack)?;
    push_bool(stack, min <= x && x < max);
    Ok(())
}

// ============================================================================
// Hashing
// ============================================================================

fn hash_top(stack: &mut Stack, f: fn(&[u8]) -> ByteString) -> OpResult {
    let item = pop(stack)?;
    stack.push(f(&item));
    Ok(())
}

fn op_ripemd160(stack: &mut Stack) -> OpResult {
    hash_top(stack, |data| ripemd160(data).to_vec())
}

fn op_sha1(stack: &mut Stack) -> OpResult {
    hash_top(stack, |data| sha1(data).to_vec())
}

fn op_sha256(stack: &mut Stack) -> OpResult {
    hash_top(stack, |data| sha256(data).to_vec())
}

fn op_hash160(stack: &mut Stack) -> OpResult {
    hash_top(stack, |data| hash160(data).to_vec())
}

fn op_hash256(stack: &mut Stack) -> OpResult {
    hash_top(stack, |data| hash256(data).to_vec())
}

// ============================================================================
// Signatures
// ============================================================================

/// DER signature with the trailing sighash-type byte removed.
fn parse_stack_signature(item: &[u8]) -> std::result::Result<Signature, ScriptErrorCode> {
    let (_, der) = item.split_last().ok_or(ScriptErrorCode::BadEncoding)?;
    Signature::parse_der(der).map_err(|e| {
        debug!("signature decode failed: {e}");
        ScriptErrorCode::BadEncoding
    })
}

fn parse_stack_pubkey(item: &[u8]) -> std::result::Result<Point, ScriptErrorCode> {
    Point::parse_sec(item).map_err(|e| {
        debug!("public key decode failed: {e}");
        ScriptErrorCode::BadEncoding
    })
}

fn op_checksig(stack: &mut Stack, z: &BigUint) -> OpResult {
    require(stack, 2)?;
    let pubkey = pop(stack)?;
    let sig = pop(stack)?;
    let point = parse_stack_pubkey(&pubkey)?;
    let sig = parse_stack_signature(&sig)?;
    push_bool(stack, verify(&point, &sig, z));
    Ok(())
}

fn op_checksigverify(stack: &mut Stack, z: &BigUint) -> OpResult {
    op_checksig(stack, z)?;
    op_verify(stack)
}

/// Pop a count followed by that many items; items come back in push order.
fn pop_counted(
    stack: &mut Stack,
    max: i64,
) -> std::result::Result<Vec<ByteString>, ScriptErrorCode> {
    let count = pop_num(stack)?;
    if !(0..=max).contains(&count) {
        return Err(ScriptErrorCode::PubkeyCount);
    }
    let count = count as usize;
    require(stack, count)?;
    Ok(stack.split_off(stack.len() - count))
}

/// `<dummy> <sig>... m <pubkey>... n`
///
/// Signatures must match keys in order; each key is tried at most once.
fn op_checkmultisig(stack: &mut Stack, z: &BigUint) -> OpResult {
    let pubkeys = pop_counted(stack, MAX_PUBKEYS_PER_MULTISIG)?;
    let sigs = pop_counted(stack, pubkeys.len() as i64)?;
    // Consensus pops one element beyond the signatures
    pop(stack)?;

    let points = pubkeys
        .iter()
        .map(|pk| parse_stack_pubkey(pk))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let signatures = sigs
        .iter()
        .map(|sig| parse_stack_signature(sig))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut keys = points.iter();
    let all_matched = signatures.iter().all(|sig| keys.any(|point| verify(point, sig, z)));
    push_bool(stack, all_matched);
    Ok(())
}

fn op_checkmultisigverify(stack: &mut Stack, z: &BigUint) -> OpResult {
    op_checkmultisig(stack, z)?;
    op_verify(stack)
}
