mod routes;

use actix_web::{web, App, HttpServer};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

static API_PREFIX: &str = "/apibeta/api/v1";

#[derive(Clone)]
struct MockServerConfiguration {
    client_id: String,
    client_secret: String,
    access_token: String,
    customer: Value,
}

#[derive(Clone)]
pub struct MockAccount {
    pub account: Value,
    pub transactions: Vec<Value>,
    pub payments: Vec<Value>,
}

impl MockAccount {
    fn account_id(&self) -> &str {
        self.account["accountId"].as_str().unwrap_or_default()
    }
}

#[derive(Clone, Default)]
struct MockServerStorageInner {
    accounts: Vec<MockAccount>,
    /// Envelope errors to return, keyed by resource path (e.g. `Transactions/123`).
    failures: HashMap<String, (String, String)>,
    /// `length` query parameters received, keyed by resource path.
    requested_lengths: HashMap<String, Vec<u32>>,
    token_requests: usize,
}

/// In-memory storage for the accounts served by the mock server.
type MockServerStorage = Arc<RwLock<MockServerStorageInner>>;

/// Simple mock server for Sbanken APIs used in local integration tests.
pub struct SbankenMockServer {
    url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    storage: MockServerStorage,
}

impl SbankenMockServer {
    pub async fn start(client_id: &str, client_secret: &str) -> Self {
        let configuration = MockServerConfiguration {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            access_token: Uuid::new_v4().to_string(),
            customer: json!({
                "customerId": "01010112345",
                "firstName": "Ola",
                "lastName": "Nordmann",
                "emailAddress": "ola@example.com"
            }),
        };

        // Setup the in-memory storage
        let storage = MockServerStorage::default();
        let storage_clone = storage.clone();

        // Setup the mock HTTP server and bind it to a random port
        let http_server_factory = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(configuration.clone()))
                .app_data(web::Data::new(storage.clone()))
                .service(
                    web::resource("/identityserver/connect/token")
                        .route(web::post().to(routes::post_token)),
                )
                .service(
                    web::scope(API_PREFIX)
                        .service(
                            web::resource("/Accounts/").route(web::get().to(routes::list_accounts)),
                        )
                        .service(
                            web::resource("/Accounts/{id}")
                                .route(web::get().to(routes::get_account_by_id)),
                        )
                        .service(
                            web::resource("/Transactions/{id}")
                                .route(web::get().to(routes::list_transactions)),
                        )
                        .service(
                            web::resource("/Payments/{id}")
                                .route(web::get().to(routes::list_payments)),
                        )
                        .service(
                            web::resource("/Customers/").route(web::get().to(routes::get_customer)),
                        ),
                )
        })
        .workers(1)
        .bind("127.0.0.1:0")
        .unwrap();

        // Retrieve the address and port the server was bound to
        let addr = http_server_factory.addrs().first().cloned().unwrap();

        // Prepare a oneshot channel to kill the HTTP server when this struct is dropped
        let (shutdown_sender, shutdown_recv) = oneshot::channel();

        // Start the server in another task
        let http_server = http_server_factory.run();
        tokio::spawn(async move {
            tokio::select! {
                _ = http_server => panic!("HTTP server crashed"),
                _ = shutdown_recv => { /* Intentional shutdown */ }
            }
        });

        Self {
            url: Url::parse(&format!("http://{}", addr)).unwrap(),
            shutdown: Some(shutdown_sender),
            storage: storage_clone,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn add_account(&self, account: MockAccount) {
        self.storage.write().unwrap().accounts.push(account);
    }

    /// Makes `resource` answer with an `isError` envelope until cleared.
    pub fn fail(&self, resource: &str, error_type: &str, error_message: &str) {
        self.storage.write().unwrap().failures.insert(
            resource.to_string(),
            (error_type.to_string(), error_message.to_string()),
        );
    }

    pub fn clear_failures(&self) {
        self.storage.write().unwrap().failures.clear();
    }

    pub fn token_requests(&self) -> usize {
        self.storage.read().unwrap().token_requests
    }

    pub fn requested_lengths(&self, resource: &str) -> Vec<u32> {
        self.storage
            .read()
            .unwrap()
            .requested_lengths
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }
}

impl Drop for SbankenMockServer {
    fn drop(&mut self) {
        // Send a shutdown signal to the actix server on drop
        let _ = self.shutdown.take().unwrap().send(());
    }
}
