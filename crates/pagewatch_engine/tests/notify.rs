use std::time::Duration;

use pagewatch_engine::{Notifier, NotifyError, NotifySettings, ServerChanNotifier};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer, timeout: Duration) -> NotifySettings {
    NotifySettings {
        base_url: server.uri(),
        timeout,
    }
}

#[tokio::test]
async fn posts_title_and_body_as_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/SCT123.send"))
        .and(body_string_contains("title=Page+changed"))
        .and(body_string_contains("desp=2.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"code\":0}"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier =
        ServerChanNotifier::new("SCT123", settings(&server, Duration::from_secs(5))).unwrap();
    notifier.send("Page changed", "2.png").await.expect("delivered");
}

#[tokio::test]
async fn error_status_is_a_delivery_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifier =
        ServerChanNotifier::new("SCT123", settings(&server, Duration::from_secs(5))).unwrap();
    let err = notifier.send("t", "b").await.unwrap_err();
    assert_eq!(err, NotifyError::Status(500));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let notifier =
        ServerChanNotifier::new("SCT123", settings(&server, Duration::from_millis(50))).unwrap();
    let err = notifier.send("t", "b").await.unwrap_err();
    assert_eq!(err, NotifyError::Timeout);
}

#[test]
fn blank_key_is_rejected() {
    let err = ServerChanNotifier::new("  ", NotifySettings::default()).unwrap_err();
    assert_eq!(err, NotifyError::MissingKey);
}
