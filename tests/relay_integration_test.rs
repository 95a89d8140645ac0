use httpmock::prelude::*;
use profile_relay::core::relay::channel;
use profile_relay::core::{Payload, RelayRequest, RelayResponse};
use profile_relay::{start_relay, FetchExecutor};
use serde_json::json;
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_concurrent_requests_resolve_independently() {
    let server = MockServer::start();
    let slow_mock = server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .header("Content-Type", "application/json")
            .delay(Duration::from_millis(300))
            .json_body(json!({"which": "slow"}));
    });
    let fast_mock = server.mock(|when, then| {
        when.method(GET).path("/fast");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"which": "fast"}));
    });

    let (relay, _executor) = start_relay(None).unwrap();

    let slow_relay = relay.clone();
    let slow_url = server.url("/slow");
    let slow = tokio::spawn(async move { slow_relay.send(RelayRequest::fetch(slow_url)).await });

    let fast = relay.send(RelayRequest::fetch(server.url("/fast"))).await;
    assert_eq!(
        assert_ok!(fast),
        RelayResponse::Data(Payload::Json(json!({"which": "fast"})))
    );
    assert!(!slow.is_finished());

    let slow = slow.await.unwrap();
    assert_eq!(
        assert_ok!(slow),
        RelayResponse::Data(Payload::Json(json!({"which": "slow"})))
    );

    slow_mock.assert();
    fast_mock.assert();
}

#[tokio::test]
async fn test_response_union_is_exclusive() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ok");
        then.status(204);
    });
    for status in [400, 401, 403, 404, 500, 503] {
        server.mock(|when, then| {
            when.method(GET).path(format!("/status/{}", status));
            then.status(status);
        });
    }

    let (relay, _executor) = start_relay(None).unwrap();

    let ok = relay.send(RelayRequest::fetch(server.url("/ok"))).await.unwrap();
    assert!(ok.is_data() && !ok.is_error());

    for status in [400, 401, 403, 404, 500, 503] {
        let response = relay
            .send(RelayRequest::fetch(server.url(format!("/status/{}", status))))
            .await
            .unwrap();
        assert!(response.is_error() && !response.is_data());
        assert_eq!(
            response,
            RelayResponse::Error(format!("HTTP error! Status: {}", status))
        );
    }
}

#[tokio::test]
async fn test_timeout_surfaces_channel_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/hang");
        then.status(200).delay(Duration::from_secs(3));
    });

    let (relay, _executor) = start_relay(Some(Duration::from_millis(100))).unwrap();
    let err = relay
        .send(RelayRequest::fetch(server.url("/hang")))
        .await
        .unwrap_err();

    assert!(matches!(err, profile_relay::ViewerError::ChannelError { .. }));
}

#[tokio::test]
async fn test_executor_stops_when_all_channels_drop() {
    let (relay, inbox) = channel(None);
    let handle = FetchExecutor::new(reqwest::Client::new()).spawn(inbox);

    drop(relay);

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("executor should stop")
        .unwrap();
}
