//! API key authorization
//!
//! Logger management only asks "does this presented key own that record".
//! The check lives behind [`ApiKeyAuthorizer`] so a signed-token scheme can
//! replace plain key comparison without touching the services.

use subtle::ConstantTimeEq;

pub trait ApiKeyAuthorizer: Send + Sync {
    /// `true` when `presented` grants access to a record owned by `owner_key`.
    fn owns(&self, presented: &str, owner_key: &str) -> bool;
}

/// Opaque capability token compared by value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainKeyAuthorizer;

impl ApiKeyAuthorizer for PlainKeyAuthorizer {
    fn owns(&self, presented: &str, owner_key: &str) -> bool {
        if presented.is_empty() {
            return false;
        }
        // 常量时间比较，避免时序侧信道
        presented.as_bytes().ct_eq(owner_key.as_bytes()).into()
    }
}
