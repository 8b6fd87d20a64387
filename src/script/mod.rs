//! Bitcoin Script: parsing, serialization and evaluation
//!
//! A [`Script`] is a sequence of [`Command`]s, either an opcode byte or a
//! data push. Scripts travel length-prefixed (VarInt) inside transactions;
//! P2SH redeem scripts are parsed from raw, unprefixed bytes.
//!
//! Evaluation lives in [`interpreter`]; opcode semantics in [`ops`].

pub mod interpreter;
pub mod num;
pub mod ops;

pub use interpreter::{verify_batch, verify_script};
pub use num::{cast_to_bool, decode_num, encode_num};

use crate::config::get_core_config;
use crate::constants::{HASH160_SIZE, MAX_DIRECT_PUSH, MAX_SCRIPT_ELEMENT_SIZE};
use crate::error::{ConsensusError, Result};
use crate::opcodes::*;
use crate::serialization::varint::{decode_varint, encode_varint};
use crate::types::Hash160;
use std::fmt;

/// One script element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Opcode byte
    Op(u8),
    /// Data push (pushed verbatim onto the stack)
    Push(Vec<u8>),
}

impl Command {
    pub fn is_op(&self, op: u8) -> bool {
        matches!(self, Command::Op(o) if *o == op)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Script {
    pub cmds: Vec<Command>,
}

impl From<Vec<Command>> for Script {
    fn from(cmds: Vec<Command>) -> Self {
        Self { cmds }
    }
}

fn parse_error(msg: String) -> ConsensusError {
    ConsensusError::ScriptParse(msg.into())
}

impl Script {
    pub fn new(cmds: Vec<Command>) -> Self {
        Self { cmds }
    }

    pub fn cmds(&self) -> &[Command] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Parse a VarInt-length-prefixed script, bounded by the configured
    /// `max_script_size`. Returns the script and the bytes consumed.
    pub fn parse(data: &[u8]) -> Result<(Script, usize)> {
        Self::parse_with_limit(data, get_core_config().script.max_script_size)
    }

    /// [`Script::parse`] with an explicit size bound.
    pub fn parse_with_limit(data: &[u8], max_script_size: usize) -> Result<(Script, usize)> {
        let (declared, prefix_len) = decode_varint(data)?;
        let length = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= max_script_size)
            .ok_or_else(|| {
                parse_error(format!(
                    "declared script length {declared} exceeds limit {max_script_size}"
                ))
            })?;
        let body = data.get(prefix_len..prefix_len + length).ok_or_else(|| {
            parse_error(format!(
                "declared script length {length} but only {} bytes follow",
                data.len() - prefix_len
            ))
        })?;
        let script = Self::parse_commands(body)?;
        Ok((script, prefix_len + length))
    }

    /// Parse an unprefixed command stream, bounded by the configured `max_script_size`.
    pub fn parse_raw(data: &[u8]) -> Result<Script> {
        Self::parse_raw_with_limit(data, get_core_config().script.max_script_size)
    }

    pub fn parse_raw_with_limit(data: &[u8], max_script_size: usize) -> Result<Script> {
        if data.len() > max_script_size {
            return Err(parse_error(format!(
                "script length {} exceeds limit {max_script_size}",
                data.len()
            )));
        }
        Self::parse_commands(data)
    }

    /// Every byte of `data` must be consumed by exactly one command.
    fn parse_commands(data: &[u8]) -> Result<Script> {
        let mut cmds = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let byte = data[pos];
            pos += 1;
            let push_len = match byte {
                0x01..=0x4b => byte as usize,
                OP_PUSHDATA1 => {
                    let len = *data
                        .get(pos)
                        .ok_or_else(|| parse_error("truncated OP_PUSHDATA1 length".into()))?;
                    pos += 1;
                    len as usize
                }
                OP_PUSHDATA2 => {
                    let len = data
                        .get(pos..pos + 2)
                        .ok_or_else(|| parse_error("truncated OP_PUSHDATA2 length".into()))?;
                    pos += 2;
                    u16::from_le_bytes([len[0], len[1]]) as usize
                }
                op => {
                    cmds.push(Command::Op(op));
                    continue;
                }
            };
            let payload = data.get(pos..pos + push_len).ok_or_else(|| {
                parse_error(format!(
                    "push of {push_len} bytes at offset {pos} runs past end of script"
                ))
            })?;
            cmds.push(Command::Push(payload.to_vec()));
            pos += push_len;
        }
        Ok(Script { cmds })
    }

    /// Command stream without the length prefix.
    pub fn raw_serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for cmd in &self.cmds {
            match cmd {
                Command::Op(op) => out.push(*op),
                Command::Push(data) => {
                    let len = data.len();
                    if len <= MAX_DIRECT_PUSH {
                        out.push(len as u8);
                    } else if len <= 0xff {
                        out.push(OP_PUSHDATA1);
                        out.push(len as u8);
                    } else if len < MAX_SCRIPT_ELEMENT_SIZE {
                        out.push(OP_PUSHDATA2);
                        out.extend_from_slice(&(len as u16).to_le_bytes());
                    } else {
                        return Err(ConsensusError::Serialization(
                            format!("data push of {len} bytes is too long").into(),
                        ));
                    }
                    out.extend_from_slice(data);
                }
            }
        }
        Ok(out)
    }

    /// VarInt length prefix followed by the command stream.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let raw = self.raw_serialize()?;
        let mut out = encode_varint(raw.len() as u64);
        out.extend_from_slice(&raw);
        Ok(out)
    }

    /// Unlocking commands followed by locking commands.
    pub fn combine(&self, locking: &Script) -> Script {
        let mut cmds = Vec::with_capacity(self.cmds.len() + locking.cmds.len());
        cmds.extend_from_slice(&self.cmds);
        cmds.extend_from_slice(&locking.cmds);
        Script { cmds }
    }

    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn p2pkh(hash: &Hash160) -> Script {
        Script::new(vec![
            Command::Op(OP_DUP),
            Command::Op(OP_HASH160),
            Command::Push(hash.to_vec()),
            Command::Op(OP_EQUALVERIFY),
            Command::Op(OP_CHECKSIG),
        ])
    }

    /// `OP_HASH160 <hash> OP_EQUAL`
    pub fn p2sh(hash: &Hash160) -> Script {
        Script::new(vec![
            Command::Op(OP_HASH160),
            Command::Push(hash.to_vec()),
            Command::Op(OP_EQUAL),
        ])
    }

    /// Unlocking script for a P2SH output: the given pushes, then the
    /// serialized redeem script as the final push.
    pub fn p2sh_spend(pushes: Vec<Vec<u8>>, redeem: &Script) -> Result<Script> {
        let mut cmds: Vec<Command> = pushes.into_iter().map(Command::Push).collect();
        cmds.push(Command::Push(redeem.raw_serialize()?));
        Ok(Script { cmds })
    }

    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.cmds.as_slice(),
            [
                Command::Op(OP_DUP),
                Command::Op(OP_HASH160),
                Command::Push(h),
                Command::Op(OP_EQUALVERIFY),
                Command::Op(OP_CHECKSIG),
            ] if h.len() == HASH160_SIZE
        )
    }

    pub fn is_p2sh(&self) -> bool {
        is_p2sh_pattern(&self.cmds)
    }
}

/// `OP_HASH160 <20 bytes> OP_EQUAL` exactly.
pub(crate) fn is_p2sh_pattern<'a, I>(cmds: I) -> bool
where
    I: IntoIterator<Item = &'a Command>,
{
    let mut it = cmds.into_iter();
    matches!(
        (it.next(), it.next(), it.next(), it.next()),
        (
            Some(Command::Op(OP_HASH160)),
            Some(Command::Push(h)),
            Some(Command::Op(OP_EQUAL)),
            None,
        ) if h.len() == HASH160_SIZE
    )
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.cmds.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match cmd {
                Command::Op(op) => f.write_str(opcode_name(*op))?,
                Command::Push(data) => f.write_str(&hex::encode(data))?,
            }
        }
        Ok(())
    }
}
