//! network.* command processor.

use std::sync::Arc;

use base64::Engine;
use crosswire_bidi::network as bidi_net;
use crosswire_bidi::network::InterceptPhase;
use crosswire_bidi::{BidiError, Command};
use crosswire_cdp::protocol::fetch as cdp_fetch;
use serde_json::Value;

use crate::config::ContextConfigStorage;
use crate::context::BrowsingContextStorage;
use crate::error::{cdp_to_bidi, Result};
use crate::network::NetworkStorage;
use crate::target::manager::CdpTargetManager;

use super::{empty_result, parse_params, unknown_operation};

/// Handles network.* commands.
pub struct NetworkProcessor {
    network: Arc<NetworkStorage>,
    contexts: Arc<BrowsingContextStorage>,
    configs: Arc<ContextConfigStorage>,
    manager: Arc<CdpTargetManager>,
}

impl NetworkProcessor {
    /// New processor.
    pub fn new(
        network: Arc<NetworkStorage>,
        contexts: Arc<BrowsingContextStorage>,
        configs: Arc<ContextConfigStorage>,
        manager: Arc<CdpTargetManager>,
    ) -> Self {
        Self {
            network,
            contexts,
            configs,
            manager,
        }
    }

    /// Dispatch one operation.
    pub async fn handle(&self, operation: &str, command: Command) -> Result<Value> {
        match operation {
            "addIntercept" => self.add_intercept(parse_params(&command)?).await,
            "removeIntercept" => self.remove_intercept(parse_params(&command)?).await,
            "continueRequest" => self.continue_request(parse_params(&command)?).await,
            "continueResponse" => self.continue_response(parse_params(&command)?).await,
            "continueWithAuth" => self.continue_with_auth(parse_params(&command)?).await,
            "provideResponse" => self.provide_response(parse_params(&command)?).await,
            "failRequest" => self.fail_request(parse_params(&command)?).await,
            "setCacheBehavior" => self.set_cache_behavior(parse_params(&command)?).await,
            other => Err(unknown_operation("network", other)),
        }
    }

    async fn add_intercept(&self, params: bidi_net::AddInterceptParams) -> Result<Value> {
        if params.phases.is_empty() {
            return Err(BidiError::invalid_argument("phases must not be empty"));
        }
        if let Some(contexts) = &params.contexts {
            for context in contexts {
                let is_top = self
                    .contexts
                    .with(context, |ctx| ctx.parent_id.is_none())
                    .await?;
                if !is_top {
                    return Err(BidiError::invalid_argument(format!(
                        "context {context} is not top-level"
                    )));
                }
            }
        }

        let intercept = self
            .network
            .add_intercept(
                params.phases,
                params.url_patterns.unwrap_or_default(),
                params.contexts,
            )
            .await;

        // Abort the change and keep the previous pattern set if any
        // target rejects the new one.
        if let Err(err) = self.manager.reconcile_targets().await {
            let _ = self.network.remove_intercept(&intercept).await;
            let _ = self.manager.reconcile_targets().await;
            return Err(BidiError::unknown(err.message));
        }

        Ok(serde_json::to_value(bidi_net::AddInterceptResult { intercept })
            .unwrap_or(Value::Null))
    }

    async fn remove_intercept(&self, params: bidi_net::RemoveInterceptParams) -> Result<Value> {
        let removed = self.network.remove_intercept(&params.intercept).await?;
        if let Err(err) = self.manager.reconcile_targets().await {
            // Abort the change: restore the intercept and the old set.
            self.network.restore_intercept(removed).await;
            let _ = self.manager.reconcile_targets().await;
            return Err(BidiError::unknown(err.message));
        }
        Ok(empty_result())
    }

    async fn continue_request(&self, params: bidi_net::ContinueRequestParams) -> Result<Value> {
        let blocked = self
            .network
            .blocked_in_phase(&params.request, &[InterceptPhase::BeforeRequestSent])
            .await?;

        let headers = params.headers.as_ref().map(|headers| {
            headers.iter().map(header_entry).collect::<Vec<_>>()
        });
        let post_data = match &params.body {
            Some(bidi_net::BytesValue::String { value }) => {
                Some(base64::engine::general_purpose::STANDARD.encode(value))
            }
            Some(bidi_net::BytesValue::Base64 { value }) => Some(value.clone()),
            None => None,
        };

        blocked
            .session
            .send_command::<_, Value>(
                "Fetch.continueRequest",
                Some(cdp_fetch::ContinueRequestParams {
                    request_id: blocked.fetch_id.clone(),
                    url: params.url.clone(),
                    method: params.method.clone(),
                    post_data,
                    headers,
                    intercept_response: None,
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        self.network.release_blocked(&params.request).await;
        Ok(empty_result())
    }

    async fn continue_response(&self, params: bidi_net::ContinueResponseParams) -> Result<Value> {
        let blocked = self
            .network
            .blocked_in_phase(
                &params.request,
                &[InterceptPhase::ResponseStarted, InterceptPhase::AuthRequired],
            )
            .await?;

        if blocked.phase == InterceptPhase::AuthRequired {
            let credentials = params.credentials.as_ref().ok_or_else(|| {
                BidiError::invalid_argument(
                    "credentials are required to continue an auth-blocked response",
                )
            })?;
            blocked
                .session
                .send_command::<_, Value>(
                    "Fetch.continueWithAuth",
                    Some(cdp_fetch::ContinueWithAuthParams {
                        request_id: blocked.fetch_id.clone(),
                        auth_challenge_response: cdp_fetch::AuthChallengeResponse {
                            response: "ProvideCredentials".to_string(),
                            username: Some(credentials.username.clone()),
                            password: Some(credentials.password.clone()),
                        },
                    }),
                )
                .await
                .map_err(|e| cdp_to_bidi(&e))?;
        } else {
            let headers = params.headers.as_ref().map(|headers| {
                headers.iter().map(header_entry).collect::<Vec<_>>()
            });
            blocked
                .session
                .send_command::<_, Value>(
                    "Fetch.continueResponse",
                    Some(cdp_fetch::ContinueResponseParams {
                        request_id: blocked.fetch_id.clone(),
                        response_code: params.status_code.map(|code| code as i64),
                        response_phrase: params.reason_phrase.clone(),
                        response_headers: headers,
                    }),
                )
                .await
                .map_err(|e| cdp_to_bidi(&e))?;
        }
        self.network.release_blocked(&params.request).await;
        Ok(empty_result())
    }

    async fn continue_with_auth(&self, params: bidi_net::ContinueWithAuthParams) -> Result<Value> {
        let blocked = self
            .network
            .blocked_in_phase(&params.request, &[InterceptPhase::AuthRequired])
            .await?;

        let response = match params.action {
            bidi_net::ContinueWithAuthAction::Default => cdp_fetch::AuthChallengeResponse {
                response: "Default".to_string(),
                username: None,
                password: None,
            },
            bidi_net::ContinueWithAuthAction::Cancel => cdp_fetch::AuthChallengeResponse {
                response: "CancelAuth".to_string(),
                username: None,
                password: None,
            },
            bidi_net::ContinueWithAuthAction::ProvideCredentials => {
                let credentials = params.credentials.as_ref().ok_or_else(|| {
                    BidiError::invalid_argument("provideCredentials requires credentials")
                })?;
                cdp_fetch::AuthChallengeResponse {
                    response: "ProvideCredentials".to_string(),
                    username: Some(credentials.username.clone()),
                    password: Some(credentials.password.clone()),
                }
            }
        };

        blocked
            .session
            .send_command::<_, Value>(
                "Fetch.continueWithAuth",
                Some(cdp_fetch::ContinueWithAuthParams {
                    request_id: blocked.fetch_id.clone(),
                    auth_challenge_response: response,
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        self.network.release_blocked(&params.request).await;
        Ok(empty_result())
    }

    async fn provide_response(&self, params: bidi_net::ProvideResponseParams) -> Result<Value> {
        let blocked = self
            .network
            .blocked_in_phase(
                &params.request,
                &[
                    InterceptPhase::BeforeRequestSent,
                    InterceptPhase::ResponseStarted,
                ],
            )
            .await?;

        let body = match &params.body {
            Some(bidi_net::BytesValue::String { value }) => {
                Some(base64::engine::general_purpose::STANDARD.encode(value))
            }
            Some(bidi_net::BytesValue::Base64 { value }) => Some(value.clone()),
            None => None,
        };
        let headers = params.headers.as_ref().map(|headers| {
            headers.iter().map(header_entry).collect::<Vec<_>>()
        });

        blocked
            .session
            .send_command::<_, Value>(
                "Fetch.fulfillRequest",
                Some(cdp_fetch::FulfillRequestParams {
                    request_id: blocked.fetch_id.clone(),
                    response_code: params.status_code.map_or(200, |code| code as i64),
                    response_phrase: params.reason_phrase.clone(),
                    response_headers: headers,
                    body,
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        self.network.release_blocked(&params.request).await;
        Ok(empty_result())
    }

    async fn fail_request(&self, params: bidi_net::FailRequestParams) -> Result<Value> {
        let blocked = self
            .network
            .blocked_in_phase(
                &params.request,
                &[
                    InterceptPhase::BeforeRequestSent,
                    InterceptPhase::ResponseStarted,
                ],
            )
            .await?;
        blocked
            .session
            .send_command::<_, Value>(
                "Fetch.failRequest",
                Some(cdp_fetch::FailRequestParams {
                    request_id: blocked.fetch_id.clone(),
                    error_reason: "Failed".to_string(),
                }),
            )
            .await
            .map_err(|e| cdp_to_bidi(&e))?;
        self.network.release_blocked(&params.request).await;
        Ok(empty_result())
    }

    async fn set_cache_behavior(&self, params: bidi_net::SetCacheBehaviorParams) -> Result<Value> {
        let bypass = params.cache_behavior == bidi_net::CacheBehavior::Bypass;
        match &params.contexts {
            Some(contexts) => {
                for context in contexts {
                    let is_top = self
                        .contexts
                        .with(context, |ctx| ctx.parent_id.is_none())
                        .await?;
                    if !is_top {
                        return Err(BidiError::invalid_argument(format!(
                            "context {context} is not top-level"
                        )));
                    }
                }
                for context in contexts {
                    self.configs
                        .update_context(context, |config| config.cache_bypass = Some(bypass))
                        .await;
                }
                self.manager.reapply_config(Some(contexts)).await;
            }
            None => {
                self.configs
                    .update_global(|config| config.cache_bypass = Some(bypass))
                    .await;
                self.manager.reapply_config(None).await;
            }
        }
        Ok(empty_result())
    }
}

fn header_entry(header: &bidi_net::Header) -> cdp_fetch::HeaderEntry {
    cdp_fetch::HeaderEntry {
        name: header.name.clone(),
        value: match &header.value {
            bidi_net::BytesValue::String { value } | bidi_net::BytesValue::Base64 { value } => {
                value.clone()
            }
        },
    }
}
