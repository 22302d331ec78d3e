use super::{preview, record, unexpected_output};
use crate::shared::fixtures::HASH_INPUT;
use sm_interop_core::{
    normalize_digest, CapabilityOutput, CapabilityRequest, MatrixOutcome, OutcomeCollector,
    OutcomeDetail, Participants, TestFamily,
};
use sm_interop_providers::CapabilityProvider;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Every provider hashes the same input; the test passes iff all digests agree.
///
/// A provider that errors, returns a malformed digest, or answers differently
/// on a repeated call is recorded on its own and left out of the comparison.
pub async fn hash_consistency(
    providers: &[Arc<dyn CapabilityProvider>],
    collector: &mut OutcomeCollector,
) {
    info!("=== Testing SM3 hash consistency ===");
    let request = CapabilityRequest::sm3_hash(HASH_INPUT);

    let mut compared: Vec<String> = Vec::new();
    let mut digests: BTreeMap<String, String> = BTreeMap::new();

    for provider in providers {
        match stable_digest(provider.as_ref(), &request).await {
            Ok(digest) => {
                debug!(provider = provider.name(), digest = preview(&digest), "hash");
                compared.push(provider.name().to_string());
                digests.insert(provider.name().to_string(), digest);
            }
            Err(error) => record(
                collector,
                MatrixOutcome::failed(
                    TestFamily::Sm3Hash,
                    Participants::single(provider.name()),
                    error,
                ),
            ),
        }
    }

    if compared.is_empty() {
        record(
            collector,
            MatrixOutcome::failed(
                TestFamily::Sm3Hash,
                Participants::group(providers.iter().map(|p| p.name())),
                "no provider produced a digest",
            ),
        );
        return;
    }

    let distinct: BTreeSet<&String> = digests.values().collect();
    let outcome = if distinct.len() == 1 {
        MatrixOutcome::passed(TestFamily::Sm3Hash, Participants::group(compared))
    } else {
        MatrixOutcome::failed(
            TestFamily::Sm3Hash,
            Participants::group(compared),
            "Hash values do not match",
        )
        .with_detail(OutcomeDetail::DigestTable { digests })
    };
    record(collector, outcome);
}

async fn stable_digest(
    provider: &dyn CapabilityProvider,
    request: &CapabilityRequest,
) -> Result<String, String> {
    let first = digest_once(provider, request).await?;
    let second = digest_once(provider, request).await?;
    if first != second {
        return Err(format!("Hash is not deterministic: {first} then {second}"));
    }
    Ok(first)
}

async fn digest_once(
    provider: &dyn CapabilityProvider,
    request: &CapabilityRequest,
) -> Result<String, String> {
    match provider.invoke(request).await.into_output()? {
        CapabilityOutput::Digest(digest) => normalize_digest(&digest).map_err(|e| e.to_string()),
        other => Err(unexpected_output("a digest", &other)),
    }
}
