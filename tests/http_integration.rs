//! Integration tests for the inventory gateway client using wiremock
//!
//! These tests drive the full fetcher against mocked gateway endpoints,
//! covering request shape, response extraction, retries and caching.

use cloudscope::cloud::gateway::GatewayConnector;
use cloudscope::{
    CredentialRecord, Credentials, FetchError, Provider, ResourceFetcher, RetryPolicy, TtlCache,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn aws_credentials() -> Credentials {
    Credentials::from([(
        Provider::Aws,
        CredentialRecord::new()
            .with("access_key", "AKIAEXAMPLE")
            .with("secret_key", "wJalrXUtnFEMI")
            .with("region", "eu-west-1"),
    )])
}

/// Fetcher with short backoff so real-time retries stay fast
async fn gateway_fetcher(server: &MockServer) -> ResourceFetcher {
    let endpoint = format!("{}/aws", server.uri());
    let retry = RetryPolicy::new(
        3,
        Duration::from_millis(1),
        Duration::from_millis(1),
        Duration::from_millis(5),
    );
    let mut fetcher = ResourceFetcher::new(TtlCache::new(16, Duration::from_secs(300)), retry)
        .with_connector(Arc::new(GatewayConnector::new(Provider::Aws, Some(&endpoint))));
    fetcher
        .initialize_clients(aws_credentials())
        .await
        .expect("gateway client should initialize");
    fetcher
}

fn describe_instances_body(instance_id: &str) -> serde_json::Value {
    json!({
        "Reservations": [
            {
                "ReservationId": "r-0a1b2c",
                "Instances": [
                    {
                        "InstanceId": instance_id,
                        "InstanceType": "t3.micro",
                        "State": {"Code": 16, "Name": "running"}
                    }
                ]
            }
        ]
    })
}

mod gateway_tests {
    use super::*;

    /// Successful lookup sends credentials and region, returns the instance
    #[tokio::test]
    async fn test_describe_instance_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-0123"))
            .and(basic_auth("AKIAEXAMPLE", "wJalrXUtnFEMI"))
            .and(query_param("region", "eu-west-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(describe_instances_body("i-0123")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let details = fetcher
            .get_resource_details(Provider::Aws, "i-0123")
            .await
            .expect("lookup should succeed");

        assert_eq!(details["InstanceId"], "i-0123");
        assert_eq!(details["State"]["Name"], "running");
    }

    /// Second lookup is served from cache; the mock verifies a single hit
    #[tokio::test]
    async fn test_repeated_lookup_hits_gateway_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-0123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(describe_instances_body("i-0123")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let first = fetcher.get_resource_details(Provider::Aws, "i-0123").await.unwrap();
        let second = fetcher.get_resource_details(Provider::Aws, "i-0123").await.unwrap();

        assert_eq!(first, second);
    }

    /// 503 responses are retried until the gateway recovers
    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-0123"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-0123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(describe_instances_body("i-0123")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let details = fetcher.get_resource_details(Provider::Aws, "i-0123").await.unwrap();

        assert_eq!(details["InstanceType"], "t3.micro");
    }

    /// Persistent 404 surfaces as a fetch error after all attempts
    #[tokio::test]
    async fn test_not_found_exhausts_retries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "InvalidInstanceID.NotFound"}
            })))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let err = fetcher
            .get_resource_details(Provider::Aws, "i-missing")
            .await
            .unwrap_err();

        match &err {
            FetchError::Fetch { source, .. } => {
                assert!(source.to_string().contains("404"), "got: {}", source);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            cloudscope::error::format_fetch_error(&err),
            "Error fetching i-missing from aws: Resource not found."
        );
        assert!(fetcher.cache().is_empty());
    }

    /// A response without reservations is an error, never an empty value
    #[tokio::test]
    async fn test_empty_reservations_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-0123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Reservations": []})))
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let err = fetcher
            .get_resource_details(Provider::Aws, "i-0123")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Fetch { .. }));
        assert!(!fetcher.resource_exists(Provider::Aws, "i-0123").await);
    }

    /// Malformed JSON from the gateway is a fetch error
    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/aws/ec2/instances/i-0123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let err = fetcher
            .get_resource_details(Provider::Aws, "i-0123")
            .await
            .unwrap_err();

        match err {
            FetchError::Fetch { source, .. } => {
                assert!(source.to_string().contains("Failed to parse response JSON"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    /// Unsupported ids never reach the gateway
    #[tokio::test]
    async fn test_unsupported_id_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = gateway_fetcher(&server).await;
        let err = fetcher
            .get_resource_details(Provider::Aws, "ami-0abc")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::UnsupportedOperation { .. }));
    }
}

mod connector_tests {
    use super::*;

    /// An invalid endpoint fails client construction after retries
    #[tokio::test]
    async fn test_invalid_endpoint_fails_initialization() {
        let retry = RetryPolicy::new(
            2,
            Duration::from_millis(1),
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        let mut fetcher = ResourceFetcher::new(TtlCache::default(), retry)
            .with_connector(Arc::new(GatewayConnector::new(Provider::Aws, Some("::not-a-url"))));

        let err = fetcher.initialize_clients(aws_credentials()).await.unwrap_err();
        match err {
            FetchError::ClientInit { provider, source } => {
                assert_eq!(provider, Provider::Aws);
                assert!(source.to_string().contains("Invalid gateway endpoint"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
