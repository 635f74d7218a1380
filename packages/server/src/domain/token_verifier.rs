//! TokenVerifier trait 定義
//!
//! 接続時に提示された認証情報を検証し、Identity を返すインターフェース。
//! 具体的な実装（JWT など）は Infrastructure 層が提供します。

use super::{entity::Identity, error::AuthError};

/// Credential verifier
///
/// Verification is synchronous and stateless: the credential is decoded and checked locally,
/// no network round trip is made.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Verify `credential` and return the identity it was issued for
    fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}
