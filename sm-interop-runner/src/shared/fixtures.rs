//! Inputs shared by every provider for the lifetime of a run.

pub const HASH_INPUT: &str = "Hello, SM3!";

pub const SM4_PLAINTEXT: &str = "Test message for SM4";
/// 128-bit key, hex
pub const SM4_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const SM4_CBC_IV: &str = "fedcba9876543210fedcba9876543210";

pub const SM2_SIGN_MESSAGE: &str = "Test message for SM2 signing";
pub const SM2_PLAINTEXT: &str = "Test message for SM2 encryption";
