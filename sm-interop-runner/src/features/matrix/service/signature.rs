use super::{fail_row, preview, record, unexpected_output};
use crate::shared::fixtures::SM2_SIGN_MESSAGE;
use sm_interop_core::{
    CapabilityOutput, CapabilityRequest, MatrixOutcome, OutcomeCollector, Participants,
    SignatureOutput, TestFamily,
};
use sm_interop_providers::CapabilityProvider;
use std::sync::Arc;
use tracing::{debug, info};

/// Every signer signs with a fresh key pair; every verifier checks it with
/// the signer's public key.
pub async fn sign_verify(
    providers: &[Arc<dyn CapabilityProvider>],
    collector: &mut OutcomeCollector,
) {
    info!("=== Testing SM2 sign/verify cross-provider ===");
    let test = TestFamily::Sm2SignVerify;
    let request = CapabilityRequest::sm2_sign(SM2_SIGN_MESSAGE, None);

    for signer in providers {
        let (signature, public_key) = match signed(signer.invoke(&request).await.into_output()) {
            Ok(signed) => signed,
            Err(error) => {
                fail_row(collector, test, signer.name(), providers, &error);
                continue;
            }
        };
        debug!(
            signer = signer.name(),
            signature = preview(&signature),
            "signed"
        );

        let verify = CapabilityRequest::sm2_verify(SM2_SIGN_MESSAGE, signature, public_key);
        for verifier in providers {
            let pair = Participants::pair(signer.name(), verifier.name());
            let outcome = match verifier.invoke(&verify).await.into_output() {
                Ok(CapabilityOutput::Verification { valid: true }) => {
                    MatrixOutcome::passed(test, pair)
                }
                Ok(CapabilityOutput::Verification { valid: false }) => {
                    MatrixOutcome::failed(test, pair, "Signature verification failed")
                }
                Ok(other) => MatrixOutcome::failed(
                    test,
                    pair,
                    unexpected_output("a verification result", &other),
                ),
                Err(error) => MatrixOutcome::failed(test, pair, error),
            };
            record(collector, outcome);
        }
    }
}

/// Signature and public key from a sign response, or the row's error
fn signed(result: Result<CapabilityOutput, String>) -> Result<(String, String), String> {
    match result {
        Ok(CapabilityOutput::Signature(SignatureOutput {
            signature,
            public_key: Some(public_key),
            ..
        })) => Ok((signature, public_key)),
        Ok(CapabilityOutput::Signature(_)) => Err("No public key returned".to_string()),
        Ok(other) => Err(unexpected_output("a signature", &other)),
        Err(error) => Err(format!("Signing failed: {error}")),
    }
}
