//! Adapter response codec.
//!
//! Adapters print exactly one JSON object on stdout. Every object carries a
//! `status`; the remaining keys depend on the capability that was invoked.

use crate::capability::{Capability, CapabilityOutput, CapabilityResult, SignatureOutput};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Raw JSON object emitted by an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

impl AdapterResponse {
    /// Map the raw response onto the typed result for `capability`.
    pub fn into_result(self, capability: Capability) -> CapabilityResult {
        if self.status == ResponseStatus::Error {
            return CapabilityResult::error(
                self.message
                    .unwrap_or_else(|| "unknown error".to_string()),
            );
        }

        let output = match capability {
            Capability::Sm3Hash => self.output.map(CapabilityOutput::Digest),
            Capability::Sm4Encrypt | Capability::Sm2Encrypt => {
                self.output.map(CapabilityOutput::Ciphertext)
            }
            Capability::Sm4Decrypt | Capability::Sm2Decrypt => {
                self.output.map(CapabilityOutput::Plaintext)
            }
            Capability::Sm2Sign => self.signature.map(|signature| {
                CapabilityOutput::Signature(SignatureOutput {
                    signature,
                    public_key: self.public_key.filter(|k| !k.is_empty()),
                    private_key: self.private_key.filter(|k| !k.is_empty()),
                })
            }),
            Capability::Sm2Verify => self
                .valid
                .map(|valid| CapabilityOutput::Verification { valid }),
        };

        match output {
            Some(output) => CapabilityResult::Success(output),
            None => {
                let key = required_key(capability);
                debug!(?capability, key, "adapter success response missing key");
                CapabilityResult::error(format!("adapter response missing '{key}'"))
            }
        }
    }
}

fn required_key(capability: Capability) -> &'static str {
    match capability {
        Capability::Sm2Sign => "signature",
        Capability::Sm2Verify => "valid",
        _ => "output",
    }
}

/// Parse adapter stdout for `capability`.
///
/// Only unparseable text is an `Err`; business-level failures reported by the
/// adapter come back as `CapabilityResult::Error`.
pub fn decode_response(capability: Capability, stdout: &str) -> Result<CapabilityResult> {
    let response: AdapterResponse = serde_json::from_str(stdout.trim())
        .map_err(|e| CoreError::MalformedResponse(e.to_string()))?;
    Ok(response.into_result(capability))
}
