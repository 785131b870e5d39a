//! Command invocation with session-refresh recovery.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::bridge::{CommandBridge, CommandRequest};
use crate::commands::CMD_REFRESH_TOKEN;
use crate::error::{CommandError, Result};
use crate::session::{RefreshGate, SessionExpiredHook};

type AuthPredicate = Box<dyn Fn(&CommandError) -> bool + Send + Sync>;

/// Issues commands over the bridge and recovers from expired sessions.
///
/// Failure handling for one invocation:
/// - a non-auth failure propagates unchanged, with no refresh and no retry;
/// - an auth failure triggers a session refresh (shared across concurrent
///   invocations through the [`RefreshGate`]) followed by exactly one replay
///   of the original request, whose outcome is final even if it is another
///   auth failure;
/// - a refresh failure fires the session-expired hook and propagates in
///   place of the original failure.
pub struct Invoker {
    bridge: Arc<dyn CommandBridge>,
    gate: RefreshGate,
    expiry: Arc<SessionExpiredHook>,
    is_auth_failure: AuthPredicate,
}

impl Invoker {
    pub fn new(bridge: Arc<dyn CommandBridge>) -> Self {
        Self {
            bridge,
            gate: RefreshGate::new(),
            expiry: Arc::new(SessionExpiredHook::new()),
            is_auth_failure: Box::new(CommandError::is_auth_failure),
        }
    }

    /// Replace the auth-failure predicate.
    ///
    /// Defaults to [`CommandError::is_auth_failure`]; an embedder with a
    /// richer error channel can narrow or widen the classification.
    pub fn with_auth_classifier(
        mut self,
        classify: impl Fn(&CommandError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_auth_failure = Box::new(classify);
        self
    }

    /// Hook fired when the session turns out to be unrecoverable.
    pub fn session_expired(&self) -> &SessionExpiredHook {
        &self.expiry
    }

    /// Issue a request, refreshing the session and replaying once if the
    /// first attempt fails with an auth error.
    pub fn call(&self, request: &CommandRequest) -> Result<Value> {
        tracing::debug!(command = %request.command, "issuing command");
        match self.bridge.send(request) {
            Ok(value) => Ok(value),
            Err(err) if (self.is_auth_failure)(&err) => {
                tracing::debug!(command = %request.command, error = %err, "auth failure, refreshing session");
                match self.refresh_session() {
                    Ok(()) => {
                        tracing::debug!(command = %request.command, "replaying after refresh");
                        self.bridge.send(request)
                    }
                    Err(refresh_err) => {
                        tracing::warn!(error = %refresh_err, "session refresh failed");
                        self.expiry.notify();
                        Err(refresh_err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Run, or join, the single-flight refresh command.
    fn refresh_session(&self) -> Result<()> {
        self.gate.ensure_refreshed(|| {
            self.bridge.send(&CommandRequest::new(CMD_REFRESH_TOKEN))?;
            tracing::info!("session token refreshed");
            Ok(())
        })
    }

    /// Typed invocation with arguments.
    pub fn invoke<T: DeserializeOwned>(&self, command: &str, args: impl Serialize) -> Result<T> {
        let request = CommandRequest::with_args(command, args)?;
        let value = self.call(&request)?;
        serde_json::from_value(value).map_err(CommandError::transport)
    }

    /// Typed invocation without arguments.
    pub fn invoke_no_args<T: DeserializeOwned>(&self, command: &str) -> Result<T> {
        let value = self.call(&CommandRequest::new(command))?;
        serde_json::from_value(value).map_err(CommandError::transport)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    /// Bridge that replays a scripted queue of responses per command and
    /// records every request it sees.
    #[derive(Default)]
    struct ScriptedBridge {
        replies: Mutex<HashMap<String, Vec<Result<Value>>>>,
        log: Mutex<Vec<String>>,
    }

    impl ScriptedBridge {
        fn script(self, command: &str, replies: Vec<Result<Value>>) -> Self {
            self.replies
                .lock()
                .expect("script lock")
                .insert(command.to_string(), replies);
            self
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().expect("log lock").clone()
        }
    }

    impl CommandBridge for ScriptedBridge {
        fn send(&self, request: &CommandRequest) -> Result<Value> {
            self.log
                .lock()
                .expect("log lock")
                .push(request.command.clone());
            let mut replies = self.replies.lock().expect("script lock");
            let queue = replies
                .get_mut(&request.command)
                .filter(|queue| !queue.is_empty())
                .ok_or_else(|| {
                    CommandError::Transport(format!("unscripted command {}", request.command))
                })?;
            queue.remove(0)
        }
    }

    fn unauthorized() -> CommandError {
        CommandError::remote("unauthorized", "token expired")
    }

    #[test]
    fn success_issues_the_command_once() {
        let bridge = Arc::new(
            ScriptedBridge::default().script("get_projects", vec![Ok(json!([{ "id": 1 }]))]),
        );
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>);

        let value = invoker
            .call(&CommandRequest::new("get_projects"))
            .expect("command result");
        assert_eq!(value, json!([{ "id": 1 }]));
        assert_eq!(bridge.log(), vec!["get_projects"]);
    }

    #[test]
    fn non_auth_failure_propagates_without_refresh() {
        let err = CommandError::remote("not_found", "no such project");
        let bridge =
            Arc::new(ScriptedBridge::default().script("get_projects", vec![Err(err.clone())]));
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>);

        let result = invoker.call(&CommandRequest::new("get_projects"));
        assert_eq!(result, Err(err));
        assert_eq!(bridge.log(), vec!["get_projects"]);
    }

    #[test]
    fn auth_failure_refreshes_and_replays_once() {
        let bridge = Arc::new(
            ScriptedBridge::default()
                .script(
                    "get_projects",
                    vec![Err(unauthorized()), Ok(json!([{ "id": 2 }]))],
                )
                .script(CMD_REFRESH_TOKEN, vec![Ok(Value::Null)]),
        );
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>);

        let value = invoker
            .call(&CommandRequest::new("get_projects"))
            .expect("replayed result");
        assert_eq!(value, json!([{ "id": 2 }]));
        assert_eq!(
            bridge.log(),
            vec!["get_projects", CMD_REFRESH_TOKEN, "get_projects"]
        );
    }

    #[test]
    fn replay_failure_is_final_without_second_refresh() {
        let bridge = Arc::new(
            ScriptedBridge::default()
                .script(
                    "get_projects",
                    vec![Err(unauthorized()), Err(unauthorized())],
                )
                .script(CMD_REFRESH_TOKEN, vec![Ok(Value::Null)]),
        );
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>);

        let result = invoker.call(&CommandRequest::new("get_projects"));
        assert_eq!(result, Err(unauthorized()));
        assert_eq!(
            bridge.log(),
            vec!["get_projects", CMD_REFRESH_TOKEN, "get_projects"]
        );
    }

    #[test]
    fn refresh_failure_notifies_expiry_and_replaces_the_error() {
        let refresh_err = CommandError::remote("http", "refresh endpoint said 500");
        let bridge = Arc::new(
            ScriptedBridge::default()
                .script("get_projects", vec![Err(unauthorized())])
                .script(CMD_REFRESH_TOKEN, vec![Err(refresh_err.clone())]),
        );
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>);

        let expired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&expired);
        invoker.session_expired().set(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = invoker.call(&CommandRequest::new("get_projects"));
        assert_eq!(result, Err(refresh_err));
        assert_eq!(expired.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.log(), vec!["get_projects", CMD_REFRESH_TOKEN]);
    }

    #[test]
    fn custom_classifier_overrides_the_default() {
        let err = CommandError::remote("session_gone", "please sign in");
        let bridge = Arc::new(
            ScriptedBridge::default()
                .script("get_me", vec![Err(err.clone()), Ok(json!({ "id": 1 }))])
                .script(CMD_REFRESH_TOKEN, vec![Ok(Value::Null)]),
        );
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>)
            .with_auth_classifier(|err| {
                matches!(err, CommandError::Remote { code, .. } if code == "session_gone")
            });

        let value = invoker.call(&CommandRequest::new("get_me")).expect("value");
        assert_eq!(value, json!({ "id": 1 }));
        assert_eq!(bridge.log(), vec!["get_me", CMD_REFRESH_TOKEN, "get_me"]);
    }

    #[test]
    fn typed_invoke_decodes_the_payload() {
        #[derive(serde::Deserialize)]
        struct Pong {
            ok: bool,
        }

        let bridge = Arc::new(ScriptedBridge::default().script(
            "ping",
            vec![Ok(json!({ "ok": true })), Ok(json!({ "ok": true }))],
        ));
        let invoker = Invoker::new(Arc::clone(&bridge) as Arc<dyn CommandBridge>);

        let pong: Pong = invoker.invoke_no_args("ping").expect("decoded");
        assert!(pong.ok);

        let err = invoker.invoke_no_args::<Vec<i64>>("ping").unwrap_err();
        assert!(matches!(err, CommandError::Transport(_)));
    }
}
