use serde::Serialize;

use crate::params::to_params;
use crate::{ClientError, CompletionCallback, Dispatcher, PendingCall};

const ACCESS_LOGS: &str = "team.accessLogs";
const BILLABLE_INFO: &str = "team.billableInfo";
const INFO: &str = "team.info";
const INTEGRATION_LOGS: &str = "team.integrationLogs";

/// Options for `team.accessLogs`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AccessLogsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Only logs created before this Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
}

/// Options for `team.billableInfo`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BillableInfoOptions {
    /// A user to retrieve billable information for. Defaults to all users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Options for `team.integrationLogs`. Every filter defaults to all logs.
#[derive(Clone, Debug, Default, Serialize)]
pub struct IntegrationLogsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Logs generated by this user's actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// For example `added`, `removed`, `enabled`, `disabled`, `updated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Calls into the `team` namespace.
///
/// Every method forwards a fixed method identifier and the caller's options
/// to the injected [`Dispatcher`]; none carries a required payload.
#[derive(Clone, Debug)]
pub struct TeamFacet {
    dispatcher: Dispatcher,
}

impl TeamFacet {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn name(&self) -> &'static str {
        "team"
    }

    /// Gets the access logs for the current team.
    pub fn access_logs(&self, opts: &AccessLogsOptions) -> Result<PendingCall, ClientError> {
        self.forward(ACCESS_LOGS, Some(opts), None)
    }

    /// Like [`Self::access_logs`], also reporting the outcome to `callback`.
    pub fn access_logs_with_callback(
        &self,
        opts: &AccessLogsOptions,
        callback: CompletionCallback,
    ) -> Result<PendingCall, ClientError> {
        self.forward(ACCESS_LOGS, Some(opts), Some(callback))
    }

    /// Gets billable users information for the current team.
    pub fn billable_info(&self, opts: &BillableInfoOptions) -> Result<PendingCall, ClientError> {
        self.forward(BILLABLE_INFO, Some(opts), None)
    }

    /// Like [`Self::billable_info`], also reporting the outcome to `callback`.
    pub fn billable_info_with_callback(
        &self,
        opts: &BillableInfoOptions,
        callback: CompletionCallback,
    ) -> Result<PendingCall, ClientError> {
        self.forward(BILLABLE_INFO, Some(opts), Some(callback))
    }

    /// Gets information about the current team.
    pub fn info(&self) -> Result<PendingCall, ClientError> {
        self.forward::<()>(INFO, None, None)
    }

    /// Like [`Self::info`], also reporting the outcome to `callback`.
    pub fn info_with_callback(
        &self,
        callback: CompletionCallback,
    ) -> Result<PendingCall, ClientError> {
        self.forward::<()>(INFO, None, Some(callback))
    }

    /// Gets the integration logs for the current team.
    pub fn integration_logs(
        &self,
        opts: &IntegrationLogsOptions,
    ) -> Result<PendingCall, ClientError> {
        self.forward(INTEGRATION_LOGS, Some(opts), None)
    }

    /// Like [`Self::integration_logs`], also reporting the outcome to `callback`.
    pub fn integration_logs_with_callback(
        &self,
        opts: &IntegrationLogsOptions,
        callback: CompletionCallback,
    ) -> Result<PendingCall, ClientError> {
        self.forward(INTEGRATION_LOGS, Some(opts), Some(callback))
    }

    fn forward<T: Serialize>(
        &self,
        method: &str,
        opts: Option<&T>,
        callback: Option<CompletionCallback>,
    ) -> Result<PendingCall, ClientError> {
        let options = opts.map(to_params).transpose()?;
        self.dispatcher.call(method, None, options, callback)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        AccessLogsOptions, BillableInfoOptions, IntegrationLogsOptions, TeamFacet,
    };
    use crate::Dispatcher;
    use crate::mock_transport::MockTransport;

    fn facet() -> (TeamFacet, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::replying(r#"{"ok": true}"#));
        let facet = TeamFacet::new(Dispatcher::from_shared(transport.clone()));
        (facet, transport)
    }

    fn sorted(mut fields: Vec<(String, String)>) -> Vec<(String, String)> {
        fields.sort();
        fields
    }

    #[tokio::test]
    async fn info_sends_no_parameters() {
        let (facet, transport) = facet();
        facet.info().expect("valid call").await.expect("success");

        let calls = transport.calls();
        assert_eq!(calls[0].method, "team.info");
        assert!(calls[0].params.is_empty());
    }

    #[tokio::test]
    async fn access_logs_forwards_only_set_options() {
        let (facet, transport) = facet();
        let opts = AccessLogsOptions {
            count: Some(100),
            before: Some(1_700_000_000),
            ..AccessLogsOptions::default()
        };
        facet
            .access_logs(&opts)
            .expect("valid call")
            .await
            .expect("success");

        let calls = transport.calls();
        assert_eq!(calls[0].method, "team.accessLogs");
        assert_eq!(
            sorted(calls[0].params.clone()),
            vec![
                ("before".to_owned(), "1700000000".to_owned()),
                ("count".to_owned(), "100".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn billable_info_targets_user() {
        let (facet, transport) = facet();
        let opts = BillableInfoOptions {
            user: Some("U123".to_owned()),
        };
        facet
            .billable_info(&opts)
            .expect("valid call")
            .await
            .expect("success");

        let calls = transport.calls();
        assert_eq!(calls[0].method, "team.billableInfo");
        assert_eq!(calls[0].params, vec![("user".to_owned(), "U123".to_owned())]);
    }

    #[tokio::test]
    async fn integration_logs_with_callback_reports_outcome() {
        let (facet, transport) = facet();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let opts = IntegrationLogsOptions {
            app_id: Some("A1".to_owned()),
            change_type: Some("added".to_owned()),
            ..IntegrationLogsOptions::default()
        };

        let outcome = facet
            .integration_logs_with_callback(
                &opts,
                Box::new(move |outcome| {
                    let _ = tx.send(outcome.is_ok());
                }),
            )
            .expect("valid call")
            .await;

        assert!(outcome.is_ok());
        assert!(rx.await.expect("callback fired"));
        let calls = transport.calls();
        assert_eq!(calls[0].method, "team.integrationLogs");
        assert_eq!(
            sorted(calls[0].params.clone()),
            vec![
                ("app_id".to_owned(), "A1".to_owned()),
                ("change_type".to_owned(), "added".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn info_with_callback_sees_the_awaited_result() {
        let (facet, _) = facet();
        let (tx, rx) = tokio::sync::oneshot::channel();

        let result = facet
            .info_with_callback(Box::new(move |outcome| {
                let _ = tx.send(outcome.map(Clone::clone).ok());
            }))
            .expect("valid call")
            .await
            .expect("success");

        assert_eq!(rx.await.expect("callback fired"), Some(result));
    }

    #[test]
    fn facet_is_named_after_namespace() {
        let (facet, _) = facet();
        assert_eq!(facet.name(), "team");
    }
}
