use super::cipher::{check_plaintext, ciphertext_of};
use super::{record, unexpected_output};
use crate::shared::fixtures::{SM2_PLAINTEXT, SM2_SIGN_MESSAGE};
use sm_interop_core::{
    CapabilityOutput, CapabilityRequest, MatrixOutcome, OutcomeCollector, Participants,
    SignatureOutput, TestFamily,
};
use sm_interop_providers::CapabilityProvider;
use std::sync::Arc;
use tracing::info;

struct KeyPair {
    public_key: String,
    private_key: String,
}

/// SM2 public-key encryption across providers.
///
/// Each provider K acts as key holder: it generates a key pair, every
/// provider E encrypts under K's public key, and K decrypts. Outcomes are
/// recorded as (E, K).
pub async fn sm2_round_trip(
    providers: &[Arc<dyn CapabilityProvider>],
    collector: &mut OutcomeCollector,
) {
    info!("=== Testing SM2 encrypt/decrypt cross-provider ===");
    let test = TestFamily::Sm2EncryptDecrypt;
    let keygen = CapabilityRequest::sm2_sign(SM2_SIGN_MESSAGE, None);

    for holder in providers {
        let keys = match key_pair(holder.invoke(&keygen).await.into_output()) {
            Ok(keys) => keys,
            Err(error) => {
                // Cells are (encryptor, holder); the failing holder is the consumer.
                for encryptor in providers {
                    record(
                        collector,
                        MatrixOutcome::failed(
                            test,
                            Participants::pair(encryptor.name(), holder.name()),
                            error.as_str(),
                        ),
                    );
                }
                continue;
            }
        };

        let encrypt = CapabilityRequest::sm2_encrypt(SM2_PLAINTEXT, keys.public_key.as_str());
        for encryptor in providers {
            let pair = Participants::pair(encryptor.name(), holder.name());
            let ciphertext = match ciphertext_of(encryptor.invoke(&encrypt).await.into_output()) {
                Ok(ciphertext) => ciphertext,
                Err(error) => {
                    record(
                        collector,
                        MatrixOutcome::failed(test, pair, format!("Encryption failed: {error}")),
                    );
                    continue;
                }
            };

            let decrypt = CapabilityRequest::sm2_decrypt(ciphertext, keys.private_key.as_str());
            let outcome = match holder.invoke(&decrypt).await.into_output() {
                Ok(CapabilityOutput::Plaintext(plaintext)) => {
                    check_plaintext(test, pair, SM2_PLAINTEXT, plaintext)
                }
                Ok(other) => {
                    MatrixOutcome::failed(test, pair, unexpected_output("a plaintext", &other))
                }
                Err(error) => MatrixOutcome::failed(test, pair, error),
            };
            record(collector, outcome);
        }
    }
}

fn key_pair(result: Result<CapabilityOutput, String>) -> Result<KeyPair, String> {
    match result {
        Ok(CapabilityOutput::Signature(SignatureOutput {
            public_key: Some(public_key),
            private_key: Some(private_key),
            ..
        })) => Ok(KeyPair {
            public_key,
            private_key,
        }),
        Ok(CapabilityOutput::Signature(_)) => Err("No key pair returned".to_string()),
        Ok(other) => Err(unexpected_output("a key pair", &other)),
        Err(error) => Err(format!("Key generation failed: {error}")),
    }
}
