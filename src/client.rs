use crate::facets::TeamFacet;
use crate::{
    CallResult, ClientError, CompletionCallback, Dispatcher, HttpTransport, Params, PendingCall,
};

/// Web API client exposing namespaced facets over one shared [`Dispatcher`].
///
/// For calls to methods without a facet, use [`Self::call`] or
/// [`Self::dispatcher`] directly.
#[derive(Clone, Debug)]
pub struct WebClient {
    dispatcher: Dispatcher,
    team: TeamFacet,
}

impl WebClient {
    /// Creates a client whose facets all share `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            team: TeamFacet::new(dispatcher.clone()),
            dispatcher,
        }
    }

    /// Creates a client over the default Slack endpoint authenticated with `token`.
    pub fn with_token(token: impl Into<String>) -> Result<Self, ClientError> {
        let transport = HttpTransport::slack_default()?.with_token(token);
        Ok(Self::new(Dispatcher::new(transport)))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Methods in the `team` namespace.
    pub fn team(&self) -> &TeamFacet {
        &self.team
    }

    /// Calls an arbitrary method by identifier.
    ///
    /// See [`Dispatcher::call`] for merge and delivery semantics.
    pub fn call(
        &self,
        method: &str,
        payload: Option<Params>,
        options: Option<Params>,
        callback: Option<CompletionCallback>,
    ) -> Result<PendingCall, ClientError> {
        self.dispatcher.call(method, payload, options, callback)
    }

    /// Calls an arbitrary method and awaits its result.
    pub async fn call_async(
        &self,
        method: &str,
        payload: Option<Params>,
        options: Option<Params>,
    ) -> Result<CallResult, ClientError> {
        self.dispatcher.call_async(method, payload, options).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::WebClient;
    use crate::Dispatcher;
    use crate::mock_transport::MockTransport;

    #[tokio::test]
    async fn facets_share_the_client_dispatcher() {
        let transport = Arc::new(MockTransport::replying(
            r#"{"ok": true, "team": {"id": "T1"}}"#,
        ));
        let client = WebClient::new(Dispatcher::from_shared(transport.clone()));

        let info = client.team().info().expect("valid call").await.expect("success");
        let raw = client
            .call_async("api.test", None, None)
            .await
            .expect("success");

        assert_eq!(Value::Object(info), json!({"team": {"id": "T1"}}));
        assert_eq!(Value::Object(raw), json!({"team": {"id": "T1"}}));
        let methods: Vec<_> = transport.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(methods, vec!["team.info", "api.test"]);
        assert_eq!(client.dispatcher().in_flight(), 0);
    }

    #[tokio::test]
    async fn raw_call_forwards_payload_over_options() {
        let transport = Arc::new(MockTransport::replying(r#"{"ok": true}"#));
        let client = WebClient::new(Dispatcher::from_shared(transport.clone()));
        let payload = json!({"channel": "C1"}).as_object().cloned();
        let options = json!({"channel": "C2", "limit": 10}).as_object().cloned();

        client
            .call_async("conversations.history", payload, options)
            .await
            .expect("success");

        let mut fields = transport.calls()[0].params.clone();
        fields.sort();
        assert_eq!(
            fields,
            vec![
                ("channel".to_owned(), "C1".to_owned()),
                ("limit".to_owned(), "10".to_owned()),
            ]
        );
    }
}
