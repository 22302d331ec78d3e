use crate::{Algorithm, CipherMode, CoreError, Operation, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One (algorithm, operation) pair an adapter can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Sm3Hash,
    Sm4Encrypt,
    Sm4Decrypt,
    Sm2Sign,
    Sm2Verify,
    Sm2Encrypt,
    Sm2Decrypt,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::Sm3Hash,
        Capability::Sm4Encrypt,
        Capability::Sm4Decrypt,
        Capability::Sm2Sign,
        Capability::Sm2Verify,
        Capability::Sm2Encrypt,
        Capability::Sm2Decrypt,
    ];

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Capability::Sm3Hash => Algorithm::Sm3,
            Capability::Sm4Encrypt | Capability::Sm4Decrypt => Algorithm::Sm4,
            Capability::Sm2Sign
            | Capability::Sm2Verify
            | Capability::Sm2Encrypt
            | Capability::Sm2Decrypt => Algorithm::Sm2,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Capability::Sm3Hash => Operation::Hash,
            Capability::Sm4Encrypt | Capability::Sm2Encrypt => Operation::Encrypt,
            Capability::Sm4Decrypt | Capability::Sm2Decrypt => Operation::Decrypt,
            Capability::Sm2Sign => Operation::Sign,
            Capability::Sm2Verify => Operation::Verify,
        }
    }

    /// Resolve a capability from its wire names
    pub fn parse(algorithm: &str, operation: &str) -> Result<Self> {
        let algorithm = Algorithm::parse(algorithm)?;
        let operation = Operation::parse(operation)?;

        Self::ALL
            .into_iter()
            .find(|c| c.algorithm() == algorithm && c.operation() == operation)
            .ok_or_else(|| {
                CoreError::UnsupportedCapability(format!(
                    "{algorithm} does not support '{operation}'"
                ))
            })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm(), self.operation())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm3HashInput {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm4EncryptInput {
    pub plaintext: String,
    pub key: String,
    pub mode: CipherMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm4DecryptInput {
    pub ciphertext: String,
    pub key: String,
    pub mode: CipherMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm2SignInput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm2VerifyInput {
    pub message: String,
    pub signature: String,
    /// Uncompressed point, "04"-prefixed hex
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm2EncryptInput {
    pub plaintext: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sm2DecryptInput {
    pub ciphertext: String,
    pub private_key: String,
}

/// A typed request for one capability; built fresh per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityRequest {
    Sm3Hash(Sm3HashInput),
    Sm4Encrypt(Sm4EncryptInput),
    Sm4Decrypt(Sm4DecryptInput),
    Sm2Sign(Sm2SignInput),
    Sm2Verify(Sm2VerifyInput),
    Sm2Encrypt(Sm2EncryptInput),
    Sm2Decrypt(Sm2DecryptInput),
}

impl CapabilityRequest {
    pub fn sm3_hash(data: impl Into<String>) -> Self {
        Self::Sm3Hash(Sm3HashInput { data: data.into() })
    }

    pub fn sm4_encrypt(
        plaintext: impl Into<String>,
        key: impl Into<String>,
        mode: CipherMode,
        iv: Option<String>,
    ) -> Self {
        Self::Sm4Encrypt(Sm4EncryptInput {
            plaintext: plaintext.into(),
            key: key.into(),
            mode,
            iv,
        })
    }

    pub fn sm4_decrypt(
        ciphertext: impl Into<String>,
        key: impl Into<String>,
        mode: CipherMode,
        iv: Option<String>,
    ) -> Self {
        Self::Sm4Decrypt(Sm4DecryptInput {
            ciphertext: ciphertext.into(),
            key: key.into(),
            mode,
            iv,
        })
    }

    pub fn sm2_sign(message: impl Into<String>, private_key: Option<String>) -> Self {
        Self::Sm2Sign(Sm2SignInput {
            message: message.into(),
            private_key,
        })
    }

    pub fn sm2_verify(
        message: impl Into<String>,
        signature: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self::Sm2Verify(Sm2VerifyInput {
            message: message.into(),
            signature: signature.into(),
            public_key: public_key.into(),
        })
    }

    pub fn sm2_encrypt(plaintext: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self::Sm2Encrypt(Sm2EncryptInput {
            plaintext: plaintext.into(),
            public_key: public_key.into(),
        })
    }

    pub fn sm2_decrypt(ciphertext: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self::Sm2Decrypt(Sm2DecryptInput {
            ciphertext: ciphertext.into(),
            private_key: private_key.into(),
        })
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Sm3Hash(_) => Capability::Sm3Hash,
            Self::Sm4Encrypt(_) => Capability::Sm4Encrypt,
            Self::Sm4Decrypt(_) => Capability::Sm4Decrypt,
            Self::Sm2Sign(_) => Capability::Sm2Sign,
            Self::Sm2Verify(_) => Capability::Sm2Verify,
            Self::Sm2Encrypt(_) => Capability::Sm2Encrypt,
            Self::Sm2Decrypt(_) => Capability::Sm2Decrypt,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.capability().algorithm()
    }

    pub fn operation(&self) -> Operation {
        self.capability().operation()
    }

    /// JSON text passed to the adapter after `--input`
    pub fn payload_json(&self) -> Result<String> {
        let encoded = match self {
            Self::Sm3Hash(input) => serde_json::to_string(input),
            Self::Sm4Encrypt(input) => serde_json::to_string(input),
            Self::Sm4Decrypt(input) => serde_json::to_string(input),
            Self::Sm2Sign(input) => serde_json::to_string(input),
            Self::Sm2Verify(input) => serde_json::to_string(input),
            Self::Sm2Encrypt(input) => serde_json::to_string(input),
            Self::Sm2Decrypt(input) => serde_json::to_string(input),
        };
        encoded.map_err(|e| CoreError::SerializationError(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureOutput {
    pub signature: String,
    /// Present when the adapter generated a fresh key pair
    pub public_key: Option<String>,
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityOutput {
    Digest(String),
    Ciphertext(String),
    Plaintext(String),
    Signature(SignatureOutput),
    Verification { valid: bool },
}

/// Normalized outcome of a single invocation: success XOR error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityResult {
    Success(CapabilityOutput),
    Error { message: String },
}

impl CapabilityResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::Success(_) => None,
        }
    }

    pub fn into_output(self) -> std::result::Result<CapabilityOutput, String> {
        match self {
            Self::Success(output) => Ok(output),
            Self::Error { message } => Err(message),
        }
    }
}
