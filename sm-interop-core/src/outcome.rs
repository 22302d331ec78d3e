//! Matrix outcomes and the append-only collector that owns them for a run.

use crate::CipherMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestFamily {
    Sm3Hash,
    Sm4EcbEncryptDecrypt,
    Sm4CbcEncryptDecrypt,
    Sm2SignVerify,
    Sm2EncryptDecrypt,
}

impl TestFamily {
    pub fn sm4(mode: CipherMode) -> Self {
        match mode {
            CipherMode::Ecb => TestFamily::Sm4EcbEncryptDecrypt,
            CipherMode::Cbc => TestFamily::Sm4CbcEncryptDecrypt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestFamily::Sm3Hash => "sm3_hash",
            TestFamily::Sm4EcbEncryptDecrypt => "sm4_ecb_encrypt_decrypt",
            TestFamily::Sm4CbcEncryptDecrypt => "sm4_cbc_encrypt_decrypt",
            TestFamily::Sm2SignVerify => "sm2_sign_verify",
            TestFamily::Sm2EncryptDecrypt => "sm2_encrypt_decrypt",
        }
    }
}

impl fmt::Display for TestFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Providers involved in one test event.
///
/// Variant order matters for deserialization: the most specific shape first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Participants {
    Pair { producer: String, consumer: String },
    Group { providers: Vec<String> },
    Single { provider: String },
}

impl Participants {
    pub fn single(provider: impl Into<String>) -> Self {
        Self::Single {
            provider: provider.into(),
        }
    }

    pub fn group<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Group {
            providers: providers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn pair(producer: impl Into<String>, consumer: impl Into<String>) -> Self {
        Self::Pair {
            producer: producer.into(),
            consumer: consumer.into(),
        }
    }

    pub fn involves(&self, provider: &str) -> bool {
        match self {
            Self::Pair { producer, consumer } => producer == provider || consumer == provider,
            Self::Group { providers } => providers.iter().any(|p| p == provider),
            Self::Single { provider: p } => p == provider,
        }
    }
}

impl fmt::Display for Participants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pair { producer, consumer } => write!(f, "{producer} -> {consumer}"),
            Self::Group { providers } => write!(f, "{}", providers.join(", ")),
            Self::Single { provider } => f.write_str(provider),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
}

/// Comparison data attached to an outcome for offline diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeDetail {
    DigestTable { digests: BTreeMap<String, String> },
    PlaintextMismatch { expected: String, actual: String },
}

/// One recorded pass/fail result. Never mutated after creation.
///
/// A failed outcome always carries an error and a passed one never does;
/// deserialization rejects records that break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrixOutcome")]
pub struct MatrixOutcome {
    test: TestFamily,
    #[serde(flatten)]
    participants: Participants,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<OutcomeDetail>,
    recorded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawMatrixOutcome {
    test: TestFamily,
    #[serde(flatten)]
    participants: Participants,
    status: OutcomeStatus,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<OutcomeDetail>,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<RawMatrixOutcome> for MatrixOutcome {
    type Error = String;

    fn try_from(raw: RawMatrixOutcome) -> std::result::Result<Self, Self::Error> {
        match (raw.status, &raw.error) {
            (OutcomeStatus::Passed, Some(error)) => {
                return Err(format!("passed outcome carries an error: {error}"))
            }
            (OutcomeStatus::Failed, None) => {
                return Err("failed outcome has no error".to_string())
            }
            _ => {}
        }
        Ok(Self {
            test: raw.test,
            participants: raw.participants,
            status: raw.status,
            error: raw.error,
            detail: raw.detail,
            recorded_at: raw.recorded_at,
        })
    }
}

impl MatrixOutcome {
    pub fn passed(test: TestFamily, participants: Participants) -> Self {
        Self {
            test,
            participants,
            status: OutcomeStatus::Passed,
            error: None,
            detail: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn failed(test: TestFamily, participants: Participants, error: impl Into<String>) -> Self {
        Self {
            test,
            participants,
            status: OutcomeStatus::Failed,
            error: Some(error.into()),
            detail: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: OutcomeDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn test(&self) -> TestFamily {
        self.test
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    /// Set exactly when the outcome failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn detail(&self) -> Option<&OutcomeDetail> {
        self.detail.as_ref()
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn is_passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }

    /// Status and error must agree: failed iff an error is recorded
    pub fn is_consistent(&self) -> bool {
        match self.status {
            OutcomeStatus::Passed => self.error.is_none(),
            OutcomeStatus::Failed => self.error.is_some(),
        }
    }
}

/// Append-only, ordered list of outcomes for a single run
#[derive(Debug, Default)]
pub struct OutcomeCollector {
    outcomes: Vec<MatrixOutcome>,
}

impl OutcomeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: MatrixOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, other: OutcomeCollector) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[MatrixOutcome] {
        &self.outcomes
    }

    pub fn outcomes_for(&self, test: TestFamily) -> Vec<&MatrixOutcome> {
        self.outcomes.iter().filter(|o| o.test == test).collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_outcomes(self) -> Vec<MatrixOutcome> {
        self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_outcome_has_no_error() {
        let outcome = MatrixOutcome::passed(
            TestFamily::Sm3Hash,
            Participants::group(["python", "go"]),
        );
        assert!(outcome.is_passed());
        assert!(outcome.error().is_none());
        assert!(outcome.is_consistent());
    }

    #[test]
    fn test_failed_outcome_carries_error() {
        let outcome = MatrixOutcome::failed(
            TestFamily::Sm2SignVerify,
            Participants::pair("go", "php"),
            "Signature verification failed",
        );
        assert!(!outcome.is_passed());
        assert_eq!(
            outcome.error(),
            Some("Signature verification failed")
        );
        assert!(outcome.is_consistent());
    }

    #[test]
    fn test_pair_outcome_serializes_flat() {
        let outcome = MatrixOutcome::passed(
            TestFamily::Sm4EcbEncryptDecrypt,
            Participants::pair("python", "go"),
        );
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["test"], "sm4_ecb_encrypt_decrypt");
        assert_eq!(value["producer"], "python");
        assert_eq!(value["consumer"], "go");
        assert_eq!(value["status"], "passed");
        assert!(value.get("error").is_none());
        assert!(value.get("detail").is_none());
    }

    #[test]
    fn test_outcome_json_reparses() {
        let mut digests = BTreeMap::new();
        digests.insert("go".to_string(), "aa".to_string());
        digests.insert("python".to_string(), "bb".to_string());
        let outcome = MatrixOutcome::failed(
            TestFamily::Sm3Hash,
            Participants::group(["go", "python"]),
            "Hash values do not match",
        )
        .with_detail(OutcomeDetail::DigestTable { digests });

        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: MatrixOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_single_participant_reparses() {
        let outcome = MatrixOutcome::failed(
            TestFamily::Sm3Hash,
            Participants::single("php"),
            "timed out",
        );
        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: MatrixOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.participants(), &Participants::single("php"));
    }

    #[test]
    fn test_participants_display_and_involves() {
        let pair = Participants::pair("go", "javascript");
        assert_eq!(pair.to_string(), "go -> javascript");
        assert!(pair.involves("javascript"));
        assert!(!pair.involves("php"));

        let group = Participants::group(["go", "php"]);
        assert_eq!(group.to_string(), "go, php");
        assert!(group.involves("php"));
    }

    #[test]
    fn test_collector_preserves_order() {
        let mut collector = OutcomeCollector::new();
        collector.record(MatrixOutcome::passed(
            TestFamily::Sm3Hash,
            Participants::group(["go"]),
        ));
        collector.record(MatrixOutcome::failed(
            TestFamily::Sm2SignVerify,
            Participants::pair("go", "go"),
            "Signature verification failed",
        ));

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.outcomes()[0].test(), TestFamily::Sm3Hash);
        assert_eq!(collector.outcomes()[1].test(), TestFamily::Sm2SignVerify);
        assert_eq!(collector.outcomes_for(TestFamily::Sm2SignVerify).len(), 1);
    }

    #[test]
    fn test_collector_extend_appends() {
        let mut first = OutcomeCollector::new();
        first.record(MatrixOutcome::passed(
            TestFamily::Sm3Hash,
            Participants::group(["go"]),
        ));
        let mut second = OutcomeCollector::new();
        second.record(MatrixOutcome::passed(
            TestFamily::Sm4CbcEncryptDecrypt,
            Participants::pair("go", "go"),
        ));

        first.extend(second);
        let outcomes = first.into_outcomes();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].test(), TestFamily::Sm4CbcEncryptDecrypt);
    }

    #[test]
    fn test_test_family_for_mode() {
        assert_eq!(
            TestFamily::sm4(CipherMode::Ecb),
            TestFamily::Sm4EcbEncryptDecrypt
        );
        assert_eq!(TestFamily::sm4(CipherMode::Cbc).as_str(), "sm4_cbc_encrypt_decrypt");
    }

    #[test]
    fn test_inconsistent_outcome_json_is_rejected() {
        let passed_with_error = r#"{
            "test": "sm3_hash",
            "provider": "go",
            "status": "passed",
            "error": "x",
            "recorded_at": "2024-01-01T00:00:00Z"
        }"#;
        let err = serde_json::from_str::<MatrixOutcome>(passed_with_error).unwrap_err();
        assert!(err.to_string().contains("passed outcome carries an error"));

        let failed_without_error = r#"{
            "test": "sm3_hash",
            "provider": "go",
            "status": "failed",
            "recorded_at": "2024-01-01T00:00:00Z"
        }"#;
        assert!(serde_json::from_str::<MatrixOutcome>(failed_without_error).is_err());
    }

    #[test]
    fn test_consistent_outcome_json_is_accepted() {
        let json = r#"{
            "test": "sm2_sign_verify",
            "producer": "go",
            "consumer": "php",
            "status": "failed",
            "error": "Signature verification failed",
            "recorded_at": "2024-01-01T00:00:00Z"
        }"#;
        let outcome: MatrixOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.test(), TestFamily::Sm2SignVerify);
        assert_eq!(outcome.participants(), &Participants::pair("go", "php"));
        assert_eq!(outcome.error(), Some("Signature verification failed"));
        assert!(outcome.detail().is_none());
    }
}
