use super::{fail_row, preview, record, unexpected_output};
use crate::shared::fixtures::{SM4_CBC_IV, SM4_KEY, SM4_PLAINTEXT};
use sm_interop_core::{
    CapabilityOutput, CapabilityRequest, CipherMode, MatrixOutcome, OutcomeCollector,
    OutcomeDetail, Participants, TestFamily,
};
use sm_interop_providers::CapabilityProvider;
use std::sync::Arc;
use tracing::{debug, info};

/// SM4 encrypt on every provider, decrypt on every provider, same key.
///
/// One outcome per ordered (encryptor, decryptor) pair. If encryption fails
/// the whole row is recorded failed with the encryptor's error.
pub async fn sm4_round_trip(
    providers: &[Arc<dyn CapabilityProvider>],
    mode: CipherMode,
    collector: &mut OutcomeCollector,
) {
    info!("=== Testing SM4-{mode} encrypt/decrypt cross-provider ===");
    let test = TestFamily::sm4(mode);
    let iv = mode.requires_iv().then(|| SM4_CBC_IV.to_string());

    for encryptor in providers {
        let request = CapabilityRequest::sm4_encrypt(SM4_PLAINTEXT, SM4_KEY, mode, iv.clone());
        let ciphertext = match ciphertext_of(encryptor.invoke(&request).await.into_output()) {
            Ok(ciphertext) => ciphertext,
            Err(error) => {
                fail_row(
                    collector,
                    test,
                    encryptor.name(),
                    providers,
                    &format!("Encryption failed: {error}"),
                );
                continue;
            }
        };
        debug!(
            encryptor = encryptor.name(),
            ciphertext = preview(&ciphertext),
            "encrypted"
        );

        for decryptor in providers {
            let request =
                CapabilityRequest::sm4_decrypt(ciphertext.as_str(), SM4_KEY, mode, iv.clone());
            let pair = Participants::pair(encryptor.name(), decryptor.name());
            let outcome = match decryptor.invoke(&request).await.into_output() {
                Ok(CapabilityOutput::Plaintext(plaintext)) => {
                    check_plaintext(test, pair, SM4_PLAINTEXT, plaintext)
                }
                Ok(other) => MatrixOutcome::failed(
                    test,
                    pair,
                    unexpected_output("a plaintext", &other),
                ),
                Err(error) => MatrixOutcome::failed(test, pair, error),
            };
            record(collector, outcome);
        }
    }
}

pub(crate) fn ciphertext_of(result: Result<CapabilityOutput, String>) -> Result<String, String> {
    match result? {
        CapabilityOutput::Ciphertext(ciphertext) => Ok(ciphertext),
        other => Err(unexpected_output("a ciphertext", &other)),
    }
}

pub(crate) fn check_plaintext(
    test: TestFamily,
    pair: Participants,
    expected: &str,
    actual: String,
) -> MatrixOutcome {
    if actual == expected {
        return MatrixOutcome::passed(test, pair);
    }
    MatrixOutcome::failed(
        test,
        pair,
        format!("Plaintext mismatch: expected '{expected}', got '{actual}'"),
    )
    .with_detail(OutcomeDetail::PlaintextMismatch {
        expected: expected.to_string(),
        actual,
    })
}
