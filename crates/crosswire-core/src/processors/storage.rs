//! storage.* command processor.

use std::sync::Arc;

use crosswire_bidi::network::{BytesValue, Cookie as BidiCookie, SameSite};
use crosswire_bidi::storage as bidi_storage;
use crosswire_bidi::{BidiError, Command, ErrorCode};
use crosswire_cdp::protocol::network as cdp_net;
use crosswire_cdp::protocol::storage as cdp_storage;
use crosswire_cdp::CdpMux;
use serde_json::Value;

use crate::context::{BrowsingContextStorage, DEFAULT_USER_CONTEXT};
use crate::error::{cdp_to_bidi, Result};

use super::{parse_params, unknown_operation};

/// Handles storage.* commands.
pub struct StorageProcessor {
    mux: Arc<CdpMux>,
    contexts: Arc<BrowsingContextStorage>,
}

impl StorageProcessor {
    /// New processor.
    pub fn new(mux: Arc<CdpMux>, contexts: Arc<BrowsingContextStorage>) -> Self {
        Self { mux, contexts }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "getCookies" => self.get_cookies(parse_params(&command)?).await,
            "setCookie" => self.set_cookie(parse_params(&command)?).await,
            "deleteCookies" => self.delete_cookies(parse_params(&command)?).await,
            other => Err(unknown_operation("storage", other)),
        }
    }

    /// Resolve the partition a command addresses to a browser context.
    async fn resolve_partition(
        &self,
        partition: Option<&bidi_storage::PartitionDescriptor>,
    ) -> Result<Option<String>> {
        match partition {
            None => Ok(None),
            Some(bidi_storage::PartitionDescriptor::Context { context }) => {
                let user_context = self
                    .contexts
                    .with(context, |ctx| ctx.user_context_id.clone())
                    .await?;
                Ok(normalize_user_context(&user_context))
            }
            Some(bidi_storage::PartitionDescriptor::StorageKey { user_context, .. }) => {
                Ok(user_context.as_deref().and_then(normalize_user_context_str))
            }
        }
    }

    async fn get_cookies(&self, params: bidi_storage::GetCookiesParams) -> Result<Value> {
        let browser_context_id = self.resolve_partition(params.partition.as_ref()).await?;
        let root = self.mux.session(None);
        let result: cdp_storage::GetCookiesResult = root
            .send_command(
                "Storage.getCookies",
                Some(cdp_storage::GetCookiesParams {
                    browser_context_id: browser_context_id.clone(),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        let cookies: Vec<BidiCookie> = result
            .cookies
            .iter()
            .map(to_bidi_cookie)
            .filter(|cookie| matches_filter(cookie, params.filter.as_ref()))
            .collect();

        Ok(serde_json::to_value(bidi_storage::GetCookiesResult {
            cookies,
            partition_key: partition_key(browser_context_id),
        })
        .unwrap_or(Value::Null))
    }

    async fn set_cookie(&self, params: bidi_storage::SetCookieParams) -> Result<Value> {
        let browser_context_id = self.resolve_partition(params.partition.as_ref()).await?;
        let cookie = params.cookie;
        let value = match &cookie.value {
            BytesValue::String { value } => value.clone(),
            BytesValue::Base64 { .. } => {
                return Err(BidiError::invalid_argument(
                    "base64 cookie values are not supported",
                ));
            }
        };

        let root = self.mux.session(None);
        root.send_command::<_, Value>(
            "Storage.setCookies",
            Some(cdp_storage::SetCookiesParams {
                cookies: vec![cdp_net::CookieParam {
                    name: cookie.name.clone(),
                    value,
                    url: None,
                    domain: Some(cookie.domain.clone()),
                    path: cookie.path.clone(),
                    secure: cookie.secure,
                    http_only: cookie.http_only,
                    same_site: cookie.same_site.map(same_site_str),
                    expires: cookie.expiry.map(|e| e as f64),
                }],
                browser_context_id: browser_context_id.clone(),
            }),
        )
        .await
        .map_err(|err| BidiError::new(ErrorCode::UnableToSetCookie, err.to_string()))?;

        Ok(serde_json::to_value(bidi_storage::PartitionKeyResult {
            partition_key: partition_key(browser_context_id),
        })
        .unwrap_or(Value::Null))
    }

    async fn delete_cookies(&self, params: bidi_storage::DeleteCookiesParams) -> Result<Value> {
        let browser_context_id = self.resolve_partition(params.partition.as_ref()).await?;
        let root = self.mux.session(None);
        let all: cdp_storage::GetCookiesResult = root
            .send_command(
                "Storage.getCookies",
                Some(cdp_storage::GetCookiesParams {
                    browser_context_id: browser_context_id.clone(),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;

        // Storage has no per-cookie delete: clear, then restore keepers.
        let keep: Vec<cdp_net::CookieParam> = all
            .cookies
            .iter()
            .filter(|cookie| !matches_filter(&to_bidi_cookie(cookie), params.filter.as_ref()))
            .map(|cookie| cdp_net::CookieParam {
                name: cookie.name.clone(),
                value: cookie.value.clone(),
                url: None,
                domain: Some(cookie.domain.clone()),
                path: Some(cookie.path.clone()),
                secure: Some(cookie.secure),
                http_only: Some(cookie.http_only),
                same_site: cookie.same_site.clone(),
                expires: if cookie.expires < 0.0 {
                    None
                } else {
                    Some(cookie.expires)
                },
            })
            .collect();

        root.send_command::<_, Value>(
            "Storage.clearCookies",
            Some(cdp_storage::ClearCookiesParams {
                browser_context_id: browser_context_id.clone(),
            }),
        )
        .await
        .map_err(|e| cdp_to_bidi(&e))?;

        if !keep.is_empty() {
            root.send_command::<_, Value>(
                "Storage.setCookies",
                Some(cdp_storage::SetCookiesParams {
                    cookies: keep,
                    browser_context_id: browser_context_id.clone(),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        }

        Ok(serde_json::to_value(bidi_storage::PartitionKeyResult {
            partition_key: partition_key(browser_context_id),
        })
        .unwrap_or(Value::Null))
    }
}

fn normalize_user_context(user_context: &str) -> Option<String> {
    normalize_user_context_str(user_context)
}

fn normalize_user_context_str(user_context: &str) -> Option<String> {
    if user_context == DEFAULT_USER_CONTEXT {
        None
    } else {
        Some(user_context.to_string())
    }
}

fn partition_key(browser_context_id: Option<String>) -> bidi_storage::PartitionKey {
    bidi_storage::PartitionKey {
        user_context: Some(
            browser_context_id.unwrap_or_else(|| DEFAULT_USER_CONTEXT.to_string()),
        ),
        source_origin: None,
    }
}

fn same_site_str(same_site: SameSite) -> String {
    match same_site {
        SameSite::Strict => "Strict".to_string(),
        SameSite::Lax => "Lax".to_string(),
        SameSite::None => "None".to_string(),
    }
}

fn to_bidi_cookie(cookie: &cdp_net::Cookie) -> BidiCookie {
    BidiCookie {
        name: cookie.name.clone(),
        value: BytesValue::string(cookie.value.clone()),
        domain: cookie.domain.clone(),
        path: cookie.path.clone(),
        size: cookie.size.unwrap_or(0).max(0) as u64,
        http_only: cookie.http_only,
        secure: cookie.secure,
        same_site: match cookie.same_site.as_deref() {
            Some("Strict") => SameSite::Strict,
            Some("None") => SameSite::None,
            _ => SameSite::Lax,
        },
        expiry: if cookie.expires < 0.0 {
            None
        } else {
            Some(cookie.expires as i64)
        },
    }
}

fn matches_filter(cookie: &BidiCookie, filter: Option<&bidi_storage::CookieFilter>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    if let Some(name) = &filter.name {
        if &cookie.name != name {
            return false;
        }
    }
    if let Some(value) = &filter.value {
        if &cookie.value != value {
            return false;
        }
    }
    if let Some(domain) = &filter.domain {
        if &cookie.domain != domain {
            return false;
        }
    }
    if let Some(path) = &filter.path {
        if &cookie.path != path {
            return false;
        }
    }
    if let Some(size) = filter.size {
        if cookie.size != size {
            return false;
        }
    }
    if let Some(http_only) = filter.http_only {
        if cookie.http_only != http_only {
            return false;
        }
    }
    if let Some(secure) = filter.secure {
        if cookie.secure != secure {
            return false;
        }
    }
    if let Some(same_site) = filter.same_site {
        if cookie.same_site != same_site {
            return false;
        }
    }
    if let Some(expiry) = filter.expiry {
        if cookie.expiry != Some(expiry) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests;
