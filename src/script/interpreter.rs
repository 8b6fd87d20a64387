//! Script evaluation
//!
//! Commands are consumed from a queue so that `OP_IF` can splice in the
//! selected branch and P2SH can append a redeem script. Evaluation is pure:
//! every call owns its stacks, and the signature hash `z` is supplied by the
//! transaction layer.

use super::num::cast_to_bool;
use super::ops::{instruction, Instruction};
use super::{is_p2sh_pattern, Command, Script};
use crate::config::{get_core_config, ScriptConfig};
use crate::crypto::hash160;
use crate::error::{ConsensusError, Result, ScriptErrorCode};
use crate::opcodes::{opcode_name, OP_16, OP_EQUAL, OP_HASH160};
use crate::types::Stack;
use log::{debug, trace};
use num_bigint::BigUint;
use std::collections::VecDeque;

#[cold]
fn script_error(opcode: &'static str, code: ScriptErrorCode) -> ConsensusError {
    ConsensusError::ScriptErrorWithCode {
        code,
        opcode,
        message: code.as_str().into(),
    }
}

fn command_name(cmd: &Command) -> &'static str {
    match cmd {
        Command::Op(op) => opcode_name(*op),
        Command::Push(_) => "OP_PUSHDATA",
    }
}

/// BIP16 redemption: the redeem script is on top of the stack and the queue
/// holds exactly `OP_HASH160 <hash> OP_EQUAL`.
fn redeem_p2sh(
    stack: &mut Stack,
    cmds: &mut VecDeque<Command>,
    config: &ScriptConfig,
) -> Result<()> {
    let expected = match (cmds.pop_front(), cmds.pop_front(), cmds.pop_front()) {
        (Some(Command::Op(OP_HASH160)), Some(Command::Push(hash)), Some(Command::Op(OP_EQUAL))) => {
            hash
        }
        _ => {
            return Err(script_error(
                opcode_name(OP_HASH160),
                ScriptErrorCode::P2shRedeemScript,
            ))
        }
    };
    let redeem = stack
        .pop()
        .ok_or_else(|| script_error(opcode_name(OP_HASH160), ScriptErrorCode::InvalidStackOperation))?;

    if hash160(&redeem)[..] != expected[..] {
        debug!("P2SH redeem script hash does not match {}", hex::encode(&expected));
        return Err(script_error(
            opcode_name(OP_EQUAL),
            ScriptErrorCode::P2shHashMismatch,
        ));
    }

    let script = Script::parse_raw_with_limit(&redeem, config.max_script_size).map_err(|e| {
        debug!("P2SH redeem script rejected: {e}");
        script_error(opcode_name(OP_HASH160), ScriptErrorCode::P2shRedeemScript)
    })?;
    debug!("P2SH redeem script accepted: {script}");
    cmds.extend(script.cmds);
    Ok(())
}

impl Script {
    /// Evaluate against signature hash `z` with the global script config.
    pub fn evaluate(&self, z: &BigUint) -> Result<bool> {
        self.evaluate_with_config(z, &get_core_config().script)
    }

    /// Evaluate against signature hash `z`.
    ///
    /// `Ok(true)` when every command ran and the top of the stack is truthy,
    /// `Ok(false)` when the stack ends empty or with a falsy top, and
    /// `Err(ScriptErrorWithCode)` naming the opcode that failed otherwise.
    pub fn evaluate_with_config(&self, z: &BigUint, config: &ScriptConfig) -> Result<bool> {
        let mut cmds: VecDeque<Command> = self.cmds.iter().cloned().collect();
        let mut stack = Stack::new();
        let mut altstack = Stack::new();
        let mut op_count = 0usize;

        while let Some(cmd) = cmds.pop_front() {
            let name = command_name(&cmd);
            match cmd {
                Command::Op(op) => {
                    if op > OP_16 {
                        op_count += 1;
                        if op_count > config.max_ops {
                            return Err(script_error(name, ScriptErrorCode::OpCount));
                        }
                    }
                    if config.verbose_logging {
                        trace!("executing {name} with {} stack items", stack.len());
                    }

                    let outcome = match instruction(op) {
                        Some(Instruction::Stack(f)) => f(&mut stack),
                        Some(Instruction::Conditional(f)) => f(&mut stack, &mut cmds),
                        Some(Instruction::AltStack(f)) => f(&mut stack, &mut altstack),
                        Some(Instruction::Signature(f)) => f(&mut stack, z),
                        None => Err(ScriptErrorCode::BadOpcode),
                    };
                    if let Err(code) = outcome {
                        debug!("script failed at {name}: {}", code.as_str());
                        return Err(script_error(name, code));
                    }
                }
                Command::Push(data) => {
                    if config.verbose_logging {
                        trace!("pushing {} bytes", data.len());
                    }
                    stack.push(data);
                    if config.enable_p2sh && is_p2sh_pattern(&cmds) {
                        redeem_p2sh(&mut stack, &mut cmds, config)?;
                    }
                }
            }

            if stack.len() + altstack.len() > config.max_stack_size {
                return Err(script_error(name, ScriptErrorCode::StackSize));
            }
        }

        Ok(stack.last().map_or(false, |top| cast_to_bool(top)))
    }
}

/// Parse a length-prefixed unlocking and locking script, combine them and
/// evaluate against `z`.
pub fn verify_script(script_sig: &[u8], script_pubkey: &[u8], z: &BigUint) -> Result<bool> {
    let config = get_core_config().script;
    let unlocking = parse_exact(script_sig, config.max_script_size)?;
    let locking = parse_exact(script_pubkey, config.max_script_size)?;
    unlocking.combine(&locking).evaluate_with_config(z, &config)
}

fn parse_exact(data: &[u8], max_script_size: usize) -> Result<Script> {
    let (script, consumed) = Script::parse_with_limit(data, max_script_size)?;
    if consumed != data.len() {
        return Err(ConsensusError::ScriptParse(
            format!("{} trailing bytes after script", data.len() - consumed).into(),
        ));
    }
    Ok(script)
}

/// Evaluate independent `(script, z)` jobs; results are in input order.
///
/// With the `rayon` feature the jobs run on the global thread pool.
pub fn verify_batch(jobs: &[(Script, BigUint)]) -> Vec<Result<bool>> {
    let config = get_core_config().script;
    let run = |(script, z): &(Script, BigUint)| script.evaluate_with_config(z, &config);

    #[cfg(feature = "rayon")]
    let results: Vec<Result<bool>> = {
        use rayon::prelude::*;
        jobs.par_iter().map(run).collect()
    };

    #[cfg(not(feature = "rayon"))]
    let results: Vec<Result<bool>> = jobs.iter().map(run).collect();

    results
}
