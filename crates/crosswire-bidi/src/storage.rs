//! storage module types.

use serde::{Deserialize, Serialize};

use crate::network::{BytesValue, Cookie, SameSite};

/// Which cookie partition a command addresses.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PartitionDescriptor {
    /// The partition of a browsing context.
    Context {
        /// The context.
        context: String,
    },
    /// A storage-key partition.
    #[serde(rename_all = "camelCase")]
    StorageKey {
        /// User context owning the partition.
        user_context: Option<String>,
        /// Source origin of the partition.
        source_origin: Option<String>,
    },
}

/// The partition a result was read from.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKey {
    /// User context of the partition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_context: Option<String>,
    /// Source origin of the partition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_origin: Option<String>,
}

/// Filter matched against cookies.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CookieFilter {
    /// Match by name.
    pub name: Option<String>,
    /// Match by value.
    pub value: Option<BytesValue>,
    /// Match by domain.
    pub domain: Option<String>,
    /// Match by path.
    pub path: Option<String>,
    /// Match by size.
    pub size: Option<u64>,
    /// Match by httpOnly flag.
    pub http_only: Option<bool>,
    /// Match by secure flag.
    pub secure: Option<bool>,
    /// Match by sameSite policy.
    pub same_site: Option<SameSite>,
    /// Match by expiry.
    pub expiry: Option<i64>,
}

/// Parameters for storage.getCookies.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GetCookiesParams {
    /// Cookie filter.
    pub filter: Option<CookieFilter>,
    /// Partition to read.
    pub partition: Option<PartitionDescriptor>,
}

/// Result of storage.getCookies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesResult {
    /// Matching cookies.
    pub cookies: Vec<Cookie>,
    /// Partition the cookies were read from.
    pub partition_key: PartitionKey,
}

/// Cookie fields for storage.setCookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: BytesValue,
    /// Cookie domain.
    pub domain: String,
    /// Cookie path.
    pub path: Option<String>,
    /// HttpOnly flag.
    pub http_only: Option<bool>,
    /// Secure flag.
    pub secure: Option<bool>,
    /// SameSite policy.
    pub same_site: Option<SameSite>,
    /// Expiry in seconds since epoch.
    pub expiry: Option<i64>,
}

/// Parameters for storage.setCookie.
#[derive(Debug, Clone, Deserialize)]
pub struct SetCookieParams {
    /// The cookie to set.
    pub cookie: PartialCookie,
    /// Partition to set it in.
    pub partition: Option<PartitionDescriptor>,
}

/// Result of storage.setCookie / storage.deleteCookies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionKeyResult {
    /// Partition the command applied to.
    pub partition_key: PartitionKey,
}

/// Parameters for storage.deleteCookies.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeleteCookiesParams {
    /// Cookies to delete.
    pub filter: Option<CookieFilter>,
    /// Partition to delete from.
    pub partition: Option<PartitionDescriptor>,
}
