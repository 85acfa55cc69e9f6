use crate::common::test_context::{TestContext, CHECKING_ACCOUNT_ID, SAVINGS_ACCOUNT_ID};
use chrono::Utc;
use retry_policies::policies::ExponentialBackoff;
use rust_decimal::Decimal;
use sbanken_connector::{sensor::AccountSensor, AccountTracker};
use serde_json::json;
use std::time::Duration;

const SCAN_INTERVAL: Duration = Duration::from_secs(20 * 60);

async fn tracker(ctx: &TestContext) -> AccountTracker {
    let session = ctx.connector.authenticate().await.unwrap();
    let accounts = ctx.connector.discover(&session).await.unwrap();

    AccountTracker::new(accounts, SCAN_INTERVAL)
}

#[tokio::test]
async fn poll_cycle_refreshes_every_account() {
    let ctx = TestContext::start().await;
    let mut tracker = tracker(&ctx).await;

    let summary = tracker.refresh_due(&ctx.connector, Utc::now()).await;

    assert_eq!(summary.refreshed, 2);
    assert_eq!(summary.failed, 0);
    for tracked in tracker.accounts() {
        assert!(tracked.snapshot().is_some());
        assert!(!tracked.is_stale());
    }
}

#[tokio::test]
async fn failed_cycle_keeps_last_known_state() {
    let ctx = TestContext::start().await;
    let mut tracker = tracker(&ctx)
        .await
        .with_backoff(ExponentialBackoff::builder().build_with_max_retries(0));

    tracker.refresh_due(&ctx.connector, Utc::now()).await;
    ctx.mock_server.fail(
        &format!("Transactions/{}", CHECKING_ACCOUNT_ID),
        "Forbidden",
        "no access",
    );
    let summary = tracker.refresh_due(&ctx.connector, Utc::now()).await;

    assert_eq!(summary.refreshed, 1);
    assert_eq!(summary.failed, 1);

    let checking = tracker.get(CHECKING_ACCOUNT_ID).unwrap();
    assert!(checking.is_stale());
    assert_eq!(
        checking.last_error().unwrap().api_error().unwrap().error_message,
        "no access"
    );
    assert_eq!(
        checking.snapshot().unwrap().available,
        Decimal::from(500)
    );

    let sensor = AccountSensor::from(checking);
    assert_eq!(sensor.state, Some(Decimal::from(500)));
    assert_eq!(sensor.attributes["stale"], json!(true));

    // Recovery clears the stale flag
    ctx.mock_server.clear_failures();
    tracker.refresh_due(&ctx.connector, Utc::now()).await;
    assert!(!tracker.get(CHECKING_ACCOUNT_ID).unwrap().is_stale());
}

#[tokio::test]
async fn failing_account_backs_off() {
    let ctx = TestContext::start().await;
    let mut tracker = tracker(&ctx).await.with_backoff(
        ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(60 * 60), Duration::from_secs(2 * 60 * 60))
            .build_with_max_retries(3),
    );
    ctx.mock_server.fail(
        &format!("Accounts/{}", SAVINGS_ACCOUNT_ID),
        "ServiceUnavailable",
        "Maintenance",
    );

    tracker.refresh_due(&ctx.connector, Utc::now()).await;
    let summary = tracker.refresh_due(&ctx.connector, Utc::now()).await;

    assert_eq!(summary.refreshed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        tracker
            .get(SAVINGS_ACCOUNT_ID)
            .unwrap()
            .consecutive_failures(),
        1
    );
}

#[tokio::test]
async fn sensors_are_keyed_by_account_number() {
    let ctx = TestContext::start().await;
    let mut tracker = tracker(&ctx).await;
    tracker.refresh_due(&ctx.connector, Utc::now()).await;

    let sensors = tracker
        .accounts()
        .iter()
        .map(AccountSensor::from)
        .collect::<Vec<_>>();

    assert_eq!(sensors[0].unique_id, "1234.56.78901");
    assert_eq!(sensors[0].name, "Brukskonto (1234.56.78901)");
    assert_eq!(sensors[1].unique_id, "97100000002");
    assert_eq!(sensors[1].state, Some(Decimal::from(10000)));
}

#[tokio::test]
async fn discovered_accounts_have_a_state_before_the_first_refresh() {
    let ctx = TestContext::start().await;
    ctx.mock_server.fail(
        &format!("Accounts/{}", SAVINGS_ACCOUNT_ID),
        "ServiceUnavailable",
        "Maintenance",
    );
    let session = ctx.connector.authenticate().await.unwrap();
    let accounts = ctx.connector.list_accounts(&session).await.unwrap();
    let mut tracker = AccountTracker::new(accounts, SCAN_INTERVAL);

    let summary = tracker.refresh_due(&ctx.connector, Utc::now()).await;
    assert_eq!(summary.failed, 1);

    let savings = tracker.get(SAVINGS_ACCOUNT_ID).unwrap();
    assert!(savings.snapshot().is_none());
    let sensor = AccountSensor::from(savings);
    assert_eq!(sensor.state, Some(Decimal::from(10000)));
    assert_eq!(sensor.attributes["stale"], json!(true));
}
