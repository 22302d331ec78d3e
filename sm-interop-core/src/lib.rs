pub mod capability;
pub mod outcome;
pub mod wire;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use capability::{
    Capability, CapabilityOutput, CapabilityRequest, CapabilityResult, Sm2DecryptInput,
    Sm2EncryptInput, Sm2SignInput, Sm2VerifyInput, Sm3HashInput, Sm4DecryptInput,
    Sm4EncryptInput, SignatureOutput,
};
pub use outcome::{
    MatrixOutcome, OutcomeCollector, OutcomeDetail, OutcomeStatus, Participants, TestFamily,
};

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Malformed adapter response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Sm2,
    Sm3,
    Sm4,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sm2 => "sm2",
            Algorithm::Sm3 => "sm3",
            Algorithm::Sm4 => "sm4",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "sm2" => Ok(Algorithm::Sm2),
            "sm3" => Ok(Algorithm::Sm3),
            "sm4" => Ok(Algorithm::Sm4),
            other => Err(CoreError::UnsupportedCapability(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Hash,
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Hash => "hash",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
            Operation::Sign => "sign",
            Operation::Verify => "verify",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "hash" => Ok(Operation::Hash),
            "encrypt" => Ok(Operation::Encrypt),
            "decrypt" => Ok(Operation::Decrypt),
            "sign" => Ok(Operation::Sign),
            "verify" => Ok(Operation::Verify),
            other => Err(CoreError::UnsupportedCapability(format!(
                "unknown operation '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SM4 block cipher mode, written upper-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CipherMode {
    Ecb,
    Cbc,
}

impl CipherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMode::Ecb => "ECB",
            CipherMode::Cbc => "CBC",
        }
    }

    pub fn requires_iv(&self) -> bool {
        matches!(self, CipherMode::Cbc)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SM3 digests are always 32 bytes.
pub const SM3_DIGEST_LEN: usize = 32;

/// Normalize a hex digest to lower case and check its length.
pub fn normalize_digest(digest: &str) -> Result<String> {
    let bytes = hex::decode(digest.trim()).map_err(|e| {
        CoreError::MalformedResponse(format!("digest '{digest}' is not valid hex: {e}"))
    })?;
    if bytes.len() != SM3_DIGEST_LEN {
        return Err(CoreError::MalformedResponse(format!(
            "digest has {} bytes, expected {}",
            bytes.len(),
            SM3_DIGEST_LEN
        )));
    }
    Ok(hex::encode(bytes))
}
