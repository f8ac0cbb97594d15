
use fixture::{gateway, modem, ok_data, wan_health, Fixture, MODEM_MAC};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn it_publishes_sensor_states_until_shut_down() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");
    let fx = Fixture::with()
        .scan_interval(Duration::from_millis(100))
        .state_file(state_file.clone())
        .build()
        .await;
    fx.mount_devices(ok_data(json!([
        modem(-85, "10.0.0.5"),
        gateway(json!({ "WAN2": { "ip": "10.0.0.5" } })),
    ])))
    .await;
    fx.mount_health(ok_data(wan_health(json!({
        "WAN2": { "availability": 99.5, "latency_average": 20, "uptime": 60 }
    }))))
    .await;
    let shutdown_token = CancellationToken::new();

    // Act
    let tasks = unifi_cellular::program()
        .settings(fx.settings())
        .shutdown_token(shutdown_token.clone())
        .run()
        .await
        .unwrap();
    time::sleep(Duration::from_millis(500)).await;
    shutdown_token.cancel();
    for task in tasks {
        time::timeout(Duration::from_secs(5), task)
            .await
            .expect("task did not stop")
            .unwrap()
            .unwrap();
    }

    // Assert
    let state: Value = serde_json::from_slice(&std::fs::read(&state_file).unwrap()).unwrap();
    assert_eq!(state["available"], json!(true));
    assert_eq!(state["device"]["identifier"], json!(MODEM_MAC));
    assert_eq!(state["device"]["model"], json!("U-LTE-Pro"));
    let sensor = |unique_id: &str| {
        state["sensors"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["unique_id"] == json!(unique_id))
            .cloned()
            .unwrap_or_else(|| panic!("missing {unique_id}"))
    };
    assert_eq!(sensor(&format!("{MODEM_MAC}_rsrp"))["value"], json!(-85));
    assert_eq!(
        sensor(&format!("{MODEM_MAC}_wan2_wan_availability"))["value"],
        json!(99.5)
    );

    let device_polls = fx
        .mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/stat/device"))
        .count();
    assert!(device_polls >= 3, "only {device_polls} polls");
}

#[tokio::test]
async fn it_refuses_to_start_when_the_first_poll_fails() {
    let fx = Fixture::new().await;
    fx.mount_devices(ResponseTemplate::new(401)).await;

    let result = unifi_cellular::program()
        .settings(fx.settings())
        .shutdown_token(CancellationToken::new())
        .run()
        .await;

    let err = result.err().expect("program started without a successful poll");
    assert!(format!("{err:?}").contains("authentication failed"));
}

#[tokio::test]
async fn it_refuses_a_zero_scan_interval() {
    let fx = Fixture::with().scan_interval(Duration::ZERO).build().await;
    fx.mount_devices(ok_data(json!([modem(-85, "10.0.0.5")]))).await;
    fx.mount_health(ok_data(json!([]))).await;

    let result = unifi_cellular::program()
        .settings(fx.settings())
        .shutdown_token(CancellationToken::new())
        .run()
        .await;

    let err = result.err().expect("program started with a zero scan interval");
    assert!(format!("{err:?}").contains("scan_interval"), "{err:?}");
    assert_eq!(fx.health_requests().await, 0);
}

#[tokio::test]
async fn snapshot_renders_raw_metrics_or_sensor_states() {
    let fx = Fixture::new().await;
    fx.mount_devices(ok_data(json!([modem(-85, "10.0.0.5")]))).await;
    fx.mount_health(ok_data(json!([]))).await;

    let raw = unifi_cellular::snapshot(&fx.settings(), true).await.unwrap();
    let report = unifi_cellular::snapshot(&fx.settings(), false).await.unwrap();

    assert_eq!(raw["rsrp"], json!(-85));
    assert_eq!(raw["wan_interface"], Value::Null);
    assert_eq!(report["available"], json!(true));
    assert!(!report["sensors"].as_array().unwrap().is_empty());
}
