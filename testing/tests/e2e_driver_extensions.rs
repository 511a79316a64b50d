//! End-to-end scenarios where the test itself holds every value it needs
//! and passes it explicitly into the driver extensions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{TimeZone, Utc};
use forecast_testing::{
    any, init_test_tracing, AppDriver, DriverError, DriverOptions, DriverState,
    TemperatureSequence, WeatherForecastReportBuilder,
};
use reqwest::StatusCode;
use std::time::{Duration, Instant};

async fn started_driver(options: DriverOptions) -> AppDriver {
    init_test_tracing();
    let mut driver = AppDriver::with_options(options);
    driver.start().await.expect("driver should start");
    driver
}

/// Whether nothing accepts connections at `url` any more, allowing aborted
/// tasks a moment to wind down
async fn is_released(url: &str) -> bool {
    let address = url.trim_start_matches("http://");
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(address).await.is_err() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

async fn readiness_status(driver: &AppDriver) -> String {
    let url = format!("{}/health/ready", driver.base_url().unwrap());
    let body: serde_json::Value = reqwest::get(url).await.unwrap().json().await.unwrap();
    body["status"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn reported_forecast_is_retrievable_and_announced() -> Result<(), DriverError> {
    let mut driver = started_driver(DriverOptions::default()).await;
    let report = WeatherForecastReportBuilder::new()
        .with_tenant_id("T1")
        .with_user_id("U1")
        .with_time(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        .with_temperature_c(20)
        .with_summary("Sunny")
        .build();

    let id = driver.weather_forecast_api()?.report_forecast(&report).await?;

    driver
        .weather_forecast_api()?
        .get_reported_forecast_by(id)
        .await?
        .should_be_the_same_as(&report);
    driver
        .notifications()?
        .assert_notification_sent(&report.reported_event());
    let calls = driver.notifications()?.received_calls();
    assert_eq!(
        calls[0].json::<serde_json::Value>().unwrap(),
        serde_json::json!({ "tenantId": "T1", "userId": "U1", "temperatureC": 20 })
    );

    driver.stop().await
}

#[tokio::test]
async fn too_cold_forecast_is_rejected_without_notification() -> Result<(), DriverError> {
    let mut driver = started_driver(DriverOptions::default()).await;
    let report = WeatherForecastReportBuilder::new()
        .with_temperature_c(-101)
        .build();

    let response = driver
        .weather_forecast_api()?
        .attempt_to_report_forecast(&report)
        .await?;

    response.should_be_rejected_as_bad_request();
    driver.notifications()?.should_not_include_anything();
    driver
        .weather_forecast_api()?
        .get_reported_forecasts_from(&report.tenant_id, &report.user_id)
        .await?
        .should_consist_of(&[]);

    driver.stop().await
}

#[tokio::test]
async fn any_invalid_temperature_is_rejected() -> Result<(), DriverError> {
    let mut driver = started_driver(DriverOptions::default()).await;

    for _ in 0..5 {
        let report = WeatherForecastReportBuilder::new()
            .with_temperature_c(any::invalid_temperature_c())
            .build();
        driver
            .weather_forecast_api()?
            .attempt_to_report_forecast(&report)
            .await?
            .should_be_rejected_as_bad_request();
    }
    driver.notifications()?.should_not_include_anything();

    driver.stop().await
}

#[tokio::test]
async fn listing_returns_only_the_pairs_reports_in_order() -> Result<(), DriverError> {
    let mut driver = started_driver(DriverOptions::default()).await;
    let mut temperatures = TemperatureSequence::new();
    let reported_by = |tenant: &str, user: &str, temperatures: &mut TemperatureSequence| {
        WeatherForecastReportBuilder::new()
            .with_tenant_id(tenant)
            .with_user_id(user)
            .with_distinct_valid_temperature_c(temperatures)
            .build()
    };
    let first = reported_by("T1", "U1", &mut temperatures);
    let other = reported_by("T2", "U2", &mut temperatures);
    let second = reported_by("T1", "U1", &mut temperatures);

    let api = driver.weather_forecast_api()?;
    for report in [&first, &other, &second] {
        api.report_forecast(report).await?;
    }

    let listed = api.get_reported_forecasts_from("T1", "U1").await?;
    listed.should_indicate_success();
    listed.should_consist_of(&[first.clone(), second.clone()]);

    let listed = api.get_reported_forecasts_from("T2", "U2").await?;
    listed.should_indicate_success();
    listed.should_consist_of(&[other.clone()]);

    let notifications = driver.notifications()?;
    for report in [&first, &other, &second] {
        notifications.should_include_notification_about(report);
    }
    assert_eq!(notifications.received_calls().len(), 3);

    driver.stop().await
}

#[tokio::test]
async fn ids_with_url_delimiters_are_listed_under_their_owner() -> Result<(), DriverError> {
    let mut driver = started_driver(DriverOptions::default()).await;
    let report = WeatherForecastReportBuilder::new()
        .with_tenant_id("acme/eu")
        .with_user_id("u#1?x=1")
        .build();

    let api = driver.weather_forecast_api()?;
    api.report_forecast(&report).await?;

    let listed = api.get_reported_forecasts_from("acme/eu", "u#1?x=1").await?;
    listed.should_indicate_success();
    listed.should_consist_of(&[report.clone()]);
    api.get_reported_forecasts_from("acme", "eu")
        .await?
        .should_consist_of(&[]);

    driver.stop().await
}

#[tokio::test]
async fn unknown_id_is_not_found() -> Result<(), DriverError> {
    let mut driver = started_driver(DriverOptions::default()).await;

    driver
        .weather_forecast_api()?
        .get_reported_forecast_by(forecast_core::ForecastId::new())
        .await?
        .should_be_not_found();

    driver.stop().await
}

#[tokio::test]
async fn failing_notification_sink_does_not_fail_the_report() -> Result<(), DriverError> {
    let mut driver = started_driver(
        DriverOptions::default().with_notification_status(StatusCode::INTERNAL_SERVER_ERROR),
    )
    .await;
    let report = WeatherForecastReportBuilder::new().build();

    let id = driver.weather_forecast_api()?.report_forecast(&report).await?;

    driver
        .weather_forecast_api()?
        .get_reported_forecast_by(id)
        .await?
        .should_be_the_same_as(&report);
    driver
        .notifications()?
        .assert_notification_sent(&report.reported_event());
    assert_eq!(readiness_status(&driver).await, "degraded");

    driver.stop().await
}

#[tokio::test]
async fn slow_notification_sink_delays_the_report_only_up_to_the_timeout() -> Result<(), DriverError> {
    let mut driver = started_driver(
        DriverOptions::default()
            .with_notification_timeout(Duration::from_millis(200))
            .with_notification_delay(Duration::from_secs(3)),
    )
    .await;
    let report = WeatherForecastReportBuilder::new().build();

    let started = Instant::now();
    let id = driver.weather_forecast_api()?.report_forecast(&report).await?;
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "report took {:?}",
        started.elapsed()
    );

    driver
        .weather_forecast_api()?
        .get_reported_forecast_by(id)
        .await?
        .should_be_the_same_as(&report);
    assert_eq!(readiness_status(&driver).await, "degraded");

    driver.stop().await
}

#[tokio::test]
async fn driver_operations_follow_its_lifecycle() {
    init_test_tracing();
    let mut driver = AppDriver::new();
    assert_eq!(driver.state(), DriverState::Created);
    assert!(matches!(
        driver.weather_forecast_api().unwrap_err(),
        DriverError::InvalidState {
            expected: DriverState::Started,
            actual: DriverState::Created,
        }
    ));

    driver.start().await.unwrap();
    assert_eq!(driver.state(), DriverState::Started);
    assert!(matches!(
        driver.start().await.unwrap_err(),
        DriverError::InvalidState {
            expected: DriverState::Created,
            actual: DriverState::Started,
        }
    ));

    driver.stop().await.unwrap();
    assert_eq!(driver.state(), DriverState::Stopped);
    assert!(driver.notifications().is_err());
    assert!(driver.base_url().is_err());
    assert!(matches!(
        driver.stop().await.unwrap_err(),
        DriverError::InvalidState {
            actual: DriverState::Stopped,
            ..
        }
    ));
}

#[tokio::test]
async fn stopping_releases_the_service_port() {
    let mut driver = started_driver(DriverOptions::default()).await;
    let base_url = driver.base_url().unwrap().to_string();

    driver.stop().await.unwrap();

    let after_stop = reqwest::Client::new()
        .get(format!("{base_url}/health"))
        .timeout(Duration::from_secs(1))
        .send()
        .await;
    assert!(after_stop.is_err());
}

#[tokio::test]
async fn failed_assertion_still_releases_service_and_recipient() {
    init_test_tracing();
    let (urls_tx, urls_rx) = tokio::sync::oneshot::channel();

    let scenario = tokio::spawn(async move {
        let driver = started_driver(DriverOptions::default()).await;
        let notifications = driver.notifications().unwrap();
        urls_tx
            .send((
                driver.base_url().unwrap().to_string(),
                notifications.recipient_url(),
            ))
            .unwrap();

        let never_reported = WeatherForecastReportBuilder::new().build();
        notifications.assert_notification_sent(&never_reported.reported_event());
    });

    let (service_url, recipient_url) = urls_rx.await.unwrap();
    assert!(scenario.await.unwrap_err().is_panic());

    assert!(is_released(&service_url).await, "service still listening");
    assert!(is_released(&recipient_url).await, "recipient still listening");
}

#[tokio::test]
async fn dropping_a_started_driver_releases_service_and_recipient() {
    let driver = started_driver(DriverOptions::default()).await;
    let service_url = driver.base_url().unwrap().to_string();
    let recipient_url = driver.notifications().unwrap().recipient_url();

    drop(driver);

    assert!(is_released(&service_url).await, "service still listening");
    assert!(is_released(&recipient_url).await, "recipient still listening");
}
