use crate::common::test_context::{TestContext, CHECKING_ACCOUNT_ID, SAVINGS_ACCOUNT_ID};
use rust_decimal::Decimal;

#[tokio::test]
async fn discover_accounts() {
    let ctx = TestContext::start().await;

    let session = ctx.connector.authenticate().await.unwrap();
    let accounts = ctx.connector.discover(&session).await.unwrap();

    let ids = accounts
        .iter()
        .map(|a| a.account_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![CHECKING_ACCOUNT_ID, SAVINGS_ACCOUNT_ID]);
    assert_eq!(accounts[0].name, "Brukskonto");
    assert_eq!(accounts[0].account_number, "1234.56.78901");
}

#[tokio::test]
async fn discover_is_idempotent() {
    let ctx = TestContext::start().await;

    let session = ctx.connector.authenticate().await.unwrap();
    let first = ctx.connector.discover(&session).await.unwrap();
    let second = ctx.connector.discover(&session).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn discover_failure_is_reported() {
    let ctx = TestContext::start().await;
    ctx.mock_server
        .fail("Accounts/", "ServiceUnavailable", "Try again later");

    let session = ctx.connector.authenticate().await.unwrap();
    let err = ctx.connector.discover(&session).await.unwrap_err();

    assert_eq!(err.api_error().unwrap().error_type, "ServiceUnavailable");
}

#[tokio::test]
async fn get_by_id_successful() {
    let ctx = TestContext::start().await;

    let session = ctx.connector.authenticate().await.unwrap();
    let account = ctx
        .connector
        .fetch_account(&session, CHECKING_ACCOUNT_ID)
        .await
        .unwrap();

    assert_eq!(account.identity.account_id, CHECKING_ACCOUNT_ID);
    assert_eq!(account.available, Decimal::from(500));
    assert_eq!(account.balance, Decimal::from(600));
}

#[tokio::test]
async fn get_by_id_not_found() {
    let ctx = TestContext::start().await;

    let session = ctx.connector.authenticate().await.unwrap();
    let err = ctx
        .connector
        .fetch_account(&session, "non-existent-account")
        .await
        .unwrap_err();

    assert_eq!(err.api_error().unwrap().error_type, "NotFound");
}

#[tokio::test]
async fn get_customer() {
    let ctx = TestContext::start().await;

    let session = ctx.connector.authenticate().await.unwrap();
    let customer = ctx.connector.fetch_customer(&session).await.unwrap();

    assert_eq!(customer.customer_id, "01010112345");
    assert_eq!(customer.first_name.as_deref(), Some("Ola"));
}
