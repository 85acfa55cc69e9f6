use crate::common::mock_server::{MockAccount, MockServerConfiguration, MockServerStorage};
use actix_web::{
    http::header::{HeaderName, AUTHORIZATION, USER_AGENT},
    web, HttpRequest, HttpResponse,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub(super) struct TokenRequest {
    grant_type: String,
}

#[derive(Deserialize)]
pub(super) struct LengthQuery {
    length: u32,
}

fn item(item: &Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "isError": false,
        "errorType": null,
        "errorMessage": null,
        "item": item
    }))
}

fn items(items: &[Value]) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "availableItems": items.len(),
        "isError": false,
        "errorType": null,
        "errorMessage": null,
        "items": items
    }))
}

fn error(error_type: &str, error_message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "isError": true,
        "errorType": error_type,
        "errorMessage": error_message
    }))
}

/// Checks the bearer token and user agent of a data request.
fn reject_unauthorized(
    req: &HttpRequest,
    configuration: &MockServerConfiguration,
) -> Option<HttpResponse> {
    let header = |name: HeaderName| req.headers().get(name).and_then(|v| v.to_str().ok());

    if !header(USER_AGENT).map_or(false, |ua| ua.contains("sbanken-connector/")) {
        return Some(HttpResponse::BadRequest().finish());
    }

    let expected = format!("Bearer {}", configuration.access_token);
    if header(AUTHORIZATION) != Some(expected.as_str()) {
        return Some(HttpResponse::Unauthorized().finish());
    }

    None
}

fn injected_failure(storage: &MockServerStorage, resource: &str) -> Option<HttpResponse> {
    storage
        .read()
        .unwrap()
        .failures
        .get(resource)
        .map(|(error_type, error_message)| error(error_type, error_message))
}

fn find_account(storage: &MockServerStorage, id: &str) -> Option<MockAccount> {
    storage
        .read()
        .unwrap()
        .accounts
        .iter()
        .find(|a| a.account_id() == id)
        .cloned()
}

/// POST /identityserver/connect/token
pub(super) async fn post_token(
    req: HttpRequest,
    configuration: web::Data<MockServerConfiguration>,
    storage: web::Data<MockServerStorage>,
    form: web::Form<TokenRequest>,
) -> HttpResponse {
    storage.write().unwrap().token_requests += 1;

    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!(
            "{}:{}",
            configuration.client_id, configuration.client_secret
        ))
    );
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());

    if !authorized || form.grant_type != "client_credentials" {
        return HttpResponse::BadRequest().json(json!({
            "error": "invalid_client"
        }));
    }

    HttpResponse::Ok().json(json!({
        "access_token": configuration.access_token,
        "expires_in": 3600,
        "token_type": "Bearer",
        "scope": "Great.Scope"
    }))
}

/// GET /Accounts/
pub(super) async fn list_accounts(
    req: HttpRequest,
    configuration: web::Data<MockServerConfiguration>,
    storage: web::Data<MockServerStorage>,
) -> HttpResponse {
    if let Some(res) = reject_unauthorized(&req, &configuration) {
        return res;
    }
    if let Some(res) = injected_failure(&storage, "Accounts/") {
        return res;
    }

    let accounts = storage
        .read()
        .unwrap()
        .accounts
        .iter()
        .map(|a| a.account.clone())
        .collect::<Vec<_>>();

    items(&accounts)
}

/// GET /Accounts/{id}
pub(super) async fn get_account_by_id(
    req: HttpRequest,
    configuration: web::Data<MockServerConfiguration>,
    storage: web::Data<MockServerStorage>,
    id: web::Path<String>,
) -> HttpResponse {
    if let Some(res) = reject_unauthorized(&req, &configuration) {
        return res;
    }
    if let Some(res) = injected_failure(&storage, &format!("Accounts/{}", id)) {
        return res;
    }

    match find_account(&storage, &id) {
        Some(account) => item(&account.account),
        None => error("NotFound", "Account not found"),
    }
}

/// GET /Transactions/{id}?length=
pub(super) async fn list_transactions(
    req: HttpRequest,
    configuration: web::Data<MockServerConfiguration>,
    storage: web::Data<MockServerStorage>,
    id: web::Path<String>,
    query: web::Query<LengthQuery>,
) -> HttpResponse {
    list_bounded(&req, &configuration, &storage, "Transactions", &id, query.length, |a| {
        a.transactions
    })
}

/// GET /Payments/{id}?length=
pub(super) async fn list_payments(
    req: HttpRequest,
    configuration: web::Data<MockServerConfiguration>,
    storage: web::Data<MockServerStorage>,
    id: web::Path<String>,
    query: web::Query<LengthQuery>,
) -> HttpResponse {
    list_bounded(&req, &configuration, &storage, "Payments", &id, query.length, |a| {
        a.payments
    })
}

fn list_bounded(
    req: &HttpRequest,
    configuration: &MockServerConfiguration,
    storage: &MockServerStorage,
    collection: &str,
    id: &str,
    length: u32,
    select: impl FnOnce(MockAccount) -> Vec<Value>,
) -> HttpResponse {
    if let Some(res) = reject_unauthorized(req, configuration) {
        return res;
    }

    let resource = format!("{}/{}", collection, id);
    storage
        .write()
        .unwrap()
        .requested_lengths
        .entry(resource.clone())
        .or_default()
        .push(length);

    if let Some(res) = injected_failure(storage, &resource) {
        return res;
    }

    match find_account(storage, id) {
        Some(account) => {
            let entries = select(account)
                .into_iter()
                .take(length as usize)
                .collect::<Vec<_>>();
            items(&entries)
        }
        None => error("NotFound", "Account not found"),
    }
}

/// GET /Customers/
pub(super) async fn get_customer(
    req: HttpRequest,
    configuration: web::Data<MockServerConfiguration>,
) -> HttpResponse {
    if let Some(res) = reject_unauthorized(&req, &configuration) {
        return res;
    }

    item(&configuration.customer)
}
