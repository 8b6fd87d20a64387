//! Error types for curve arithmetic, codecs and script evaluation

use std::borrow::Cow;
use thiserror::Error;

/// Classification of a script evaluation failure.
///
/// Carried by [`ConsensusError::ScriptErrorWithCode`] next to the name of the
/// opcode that failed, so callers can log or match on the reason without
/// parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptErrorCode {
    /// An opcode needed more stack items than were available
    InvalidStackOperation,
    /// An opcode needed an alt-stack item that was not there
    InvalidAltStackOperation,
    /// `OP_VERIFY`, `OP_EQUALVERIFY`, `OP_NUMEQUALVERIFY` or a `*VERIFY` signature check failed
    Verify,
    /// `OP_IF`/`OP_NOTIF` without a matching `OP_ENDIF`, or a stray `OP_ELSE`/`OP_ENDIF`
    UnbalancedConditional,
    /// Numeric operand longer than the allowed encoding size
    NumericOverflow,
    /// Public key or signature bytes could not be decoded
    BadEncoding,
    /// `OP_CHECKMULTISIG` key or signature count out of range
    PubkeyCount,
    /// `OP_RETURN` was executed
    OpReturn,
    /// Opcode is disabled, reserved, or unknown to this interpreter
    BadOpcode,
    /// The P2SH redeem script did not hash to the committed value
    P2shHashMismatch,
    /// The P2SH redeem script bytes could not be parsed
    P2shRedeemScript,
    /// Stack size exceeded the configured limit
    StackSize,
    /// Non-push opcode budget exhausted
    OpCount,
}

impl ScriptErrorCode {
    /// Short human-readable description.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptErrorCode::InvalidStackOperation => "not enough items on the stack",
            ScriptErrorCode::InvalidAltStackOperation => "not enough items on the alt stack",
            ScriptErrorCode::Verify => "verification failed",
            ScriptErrorCode::UnbalancedConditional => "unbalanced conditional",
            ScriptErrorCode::NumericOverflow => "numeric operand too long",
            ScriptErrorCode::BadEncoding => "malformed public key or signature",
            ScriptErrorCode::PubkeyCount => "key or signature count out of range",
            ScriptErrorCode::OpReturn => "OP_RETURN executed",
            ScriptErrorCode::BadOpcode => "disabled or unknown opcode",
            ScriptErrorCode::P2shHashMismatch => "redeem script hash mismatch",
            ScriptErrorCode::P2shRedeemScript => "redeem script could not be parsed",
            ScriptErrorCode::StackSize => "stack size limit exceeded",
            ScriptErrorCode::OpCount => "operation limit exceeded",
        }
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConsensusError {
    #[error("Invalid field element: {0}")]
    FieldElement(Cow<'static, str>),

    #[error("Division by zero in field of order {0}")]
    DivisionByZero(Cow<'static, str>),

    #[error("Points are not on the same curve: {0}")]
    CurveMismatch(Cow<'static, str>),

    #[error("Point is not on the curve: {0}")]
    PointNotOnCurve(Cow<'static, str>),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(Cow<'static, str>),

    #[error("Invalid public key encoding: {0}")]
    InvalidPublicKey(Cow<'static, str>),

    #[error("Invalid signature: {0}")]
    InvalidSignature(Cow<'static, str>),

    #[error("Serialization error: {0}")]
    Serialization(Cow<'static, str>),

    #[error("Script parse error: {0}")]
    ScriptParse(Cow<'static, str>),

    #[error("Script execution failed at {opcode} ({code:?}): {message}")]
    ScriptErrorWithCode {
        code: ScriptErrorCode,
        opcode: &'static str,
        message: Cow<'static, str>,
    },

    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),
}

impl ConsensusError {
    /// The failing opcode's name for script evaluation errors.
    pub fn failed_opcode(&self) -> Option<&'static str> {
        match self {
            ConsensusError::ScriptErrorWithCode { opcode, .. } => Some(opcode),
            _ => None,
        }
    }

    /// The script failure classification, if this is a script evaluation error.
    pub fn script_error_code(&self) -> Option<ScriptErrorCode> {
        match self {
            ConsensusError::ScriptErrorWithCode { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
