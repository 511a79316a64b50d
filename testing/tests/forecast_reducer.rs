//! Reducer and store level tests for forecasts, using the deterministic mocks.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use forecast_core::{
    ForecastAction, ForecastEnvironment, ForecastReducer, ForecastState, NotificationError,
    OwnerKey, ValidationError,
};
use forecast_runtime::Store;
use forecast_testing::{
    assertions, FailingNotifier, RecordingNotifier, ReducerTest, SequentialIdGenerator,
    WeatherForecastReportBuilder,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn environment(notifier: Arc<RecordingNotifier>) -> ForecastEnvironment {
    ForecastEnvironment::new(Arc::new(SequentialIdGenerator::new()), notifier)
}

#[test]
fn accepted_report_is_stored_under_the_next_id() {
    let notifier = Arc::new(RecordingNotifier::new());
    let report = WeatherForecastReportBuilder::new().with_temperature_c(20).build();
    let request_id = Uuid::new_v4();
    let expected = report.clone();
    let expected_event = report.reported_event();

    ReducerTest::new(ForecastReducer)
        .with_env(environment(Arc::clone(&notifier)))
        .given_state(ForecastState::new())
        .when_action(ForecastAction::ReportForecast { request_id, report })
        .then_state(move |state| {
            assert_eq!(state.count(), 1);
            assert_eq!(state.get(&SequentialIdGenerator::nth(1)), Some(&expected));
            assert_eq!(state.list(&expected.owner()), vec![expected.clone()]);
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .then_feedback(move |actions| {
            assert!(matches!(
                actions,
                [ForecastAction::NotificationDelivered { request_id: r, id }]
                    if *r == request_id && *id == SequentialIdGenerator::nth(1)
            ));
        })
        .run();

    assert_eq!(notifier.events(), vec![expected_event]);
}

#[test]
fn too_cold_report_is_rejected_without_side_effects() {
    let notifier = Arc::new(RecordingNotifier::new());
    let report = WeatherForecastReportBuilder::new().with_temperature_c(-101).build();

    ReducerTest::new(ForecastReducer)
        .with_env(environment(Arc::clone(&notifier)))
        .given_state(ForecastState::new())
        .when_action(ForecastAction::ReportForecast {
            request_id: Uuid::new_v4(),
            report,
        })
        .then_state(|state| assert_eq!(state.count(), 0))
        .then_feedback(|actions| {
            assert!(matches!(
                actions,
                [ForecastAction::ForecastRejected {
                    error: ValidationError::TemperatureBelowMinimum {
                        minimum: -100,
                        actual: -101
                    },
                    ..
                }]
            ));
        })
        .run();

    assert!(notifier.events().is_empty());
}

#[test]
fn failed_delivery_is_fed_back_as_failure() {
    let env = ForecastEnvironment::new(
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(FailingNotifier::new(NotificationError::TimedOut(
            Duration::from_millis(100),
        ))),
    );

    ReducerTest::new(ForecastReducer)
        .with_env(env)
        .given_state(ForecastState::new())
        .when_action(ForecastAction::ReportForecast {
            request_id: Uuid::new_v4(),
            report: WeatherForecastReportBuilder::new().build(),
        })
        .then_state(|state| assert_eq!(state.count(), 1))
        .then_feedback(|actions| {
            assert!(matches!(
                actions,
                [ForecastAction::NotificationFailed {
                    error: NotificationError::TimedOut(_),
                    ..
                }]
            ));
        })
        .run();
}

#[test]
fn delivery_outcomes_only_move_counters() {
    let env = environment(Arc::new(RecordingNotifier::new()));

    ReducerTest::new(ForecastReducer)
        .with_env(env)
        .given_state(ForecastState::new())
        .when_action(ForecastAction::NotificationFailed {
            request_id: Uuid::new_v4(),
            id: SequentialIdGenerator::nth(1),
            error: NotificationError::Rejected(500),
        })
        .then_state(|state| {
            assert_eq!(state.failed_notifications, 1);
            assert_eq!(state.delivered_notifications, 0);
            assert_eq!(state.count(), 0);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn store_answers_each_report_with_its_own_outcome() {
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Store::new(
        ForecastState::new(),
        ForecastReducer,
        environment(Arc::clone(&notifier)),
    );
    let owner = OwnerKey::new("T1", "U1");

    for temperature_c in [5, -150, 7] {
        let request_id = Uuid::new_v4();
        let report = WeatherForecastReportBuilder::new()
            .with_tenant_id("T1")
            .with_user_id("U1")
            .with_temperature_c(temperature_c)
            .build();

        let outcome = store
            .send_and_wait_for(
                ForecastAction::ReportForecast { request_id, report },
                |action| action.concludes(request_id),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(outcome.request_id(), request_id);
        if temperature_c < -100 {
            assert!(matches!(outcome, ForecastAction::ForecastRejected { .. }));
        } else {
            assert!(matches!(outcome, ForecastAction::NotificationDelivered { .. }));
        }
    }

    let temperatures: Vec<i32> = store
        .state(|s| s.list(&owner))
        .await
        .iter()
        .map(|r| r.temperature_c)
        .collect();
    assert_eq!(temperatures, vec![5, 7]);
    assert_eq!(store.state(|s| s.delivered_notifications).await, 2);
    assert_eq!(notifier.events().len(), 2);

    store.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn store_answers_a_thousand_concurrent_reports() {
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Store::new(
        ForecastState::new(),
        ForecastReducer,
        environment(Arc::clone(&notifier)),
    );

    let reports: Vec<_> = (0..1000)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                let request_id = Uuid::new_v4();
                let report = WeatherForecastReportBuilder::new().build();
                store
                    .send_and_wait_for(
                        ForecastAction::ReportForecast { request_id, report },
                        |action| action.concludes(request_id),
                        Duration::from_secs(5),
                    )
                    .await
                    .map(|outcome| (request_id, outcome))
            })
        })
        .collect();

    for report in reports {
        let (request_id, outcome) = report.await.unwrap().unwrap();
        assert_eq!(outcome.request_id(), request_id);
        assert!(matches!(outcome, ForecastAction::NotificationDelivered { .. }));
    }
    assert_eq!(store.state(ForecastState::count).await, 1000);
    assert_eq!(notifier.events().len(), 1000);

    store.shutdown(Duration::from_secs(1)).await.unwrap();
}

proptest! {
    #[test]
    fn valid_reports_round_trip(temperature_c in -100_i32..=200, summary in "[a-zA-Z ]{0,24}") {
        let report = WeatherForecastReportBuilder::new()
            .with_temperature_c(temperature_c)
            .with_summary(summary)
            .build();
        let env = environment(Arc::new(RecordingNotifier::new()));
        let mut state = ForecastState::new();

        let _effects = forecast_core::reducer::Reducer::reduce(
            &ForecastReducer,
            &mut state,
            ForecastAction::ReportForecast { request_id: Uuid::new_v4(), report: report.clone() },
            &env,
        );

        prop_assert_eq!(state.get(&SequentialIdGenerator::nth(1)), Some(&report));
        prop_assert_eq!(state.list(&report.owner()), vec![report.clone()]);
    }

    #[test]
    fn invalid_reports_leave_no_trace(temperature_c in i32::MIN..-100) {
        let notifier = Arc::new(RecordingNotifier::new());
        let report = WeatherForecastReportBuilder::new()
            .with_temperature_c(temperature_c)
            .build();
        let env = environment(Arc::clone(&notifier));
        let mut state = ForecastState::new();

        let _effects = forecast_core::reducer::Reducer::reduce(
            &ForecastReducer,
            &mut state,
            ForecastAction::ReportForecast { request_id: Uuid::new_v4(), report: report.clone() },
            &env,
        );

        prop_assert_eq!(state.count(), 0);
        prop_assert!(state.list(&report.owner()).is_empty());
        prop_assert!(notifier.events().is_empty());
    }
}
