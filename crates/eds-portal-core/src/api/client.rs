//! Typed client for the enterprise data API.
//!
//! Every method goes through the `Pipeline`, so credentials are attached
//! and failures are reported to the user before they come back as `Err`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{ApiError, OutboundCall, Outcome, Pipeline, ReqwestTransport, RequestFailure, Transport};
use crate::config::Config;
use crate::models::{Customer, LoginRequest, LoginResponse, NewCustomer, QuoteRequest, QuoteResult, UserProfile};
use crate::notify::Notifier;
use crate::router::{Navigator, LOGIN_ROUTE};
use crate::session::{Persistence, SessionStore};

const LOGIN_PATH: &str = "/auth/login/";
const CUSTOMERS_PATH: &str = "/api/customers/";

pub struct ApiClient<T = ReqwestTransport> {
    pipeline: Pipeline<T>,
    timeout: Duration,
}

impl ApiClient<ReqwestTransport> {
    /// Build a client talking HTTP to the configured API.
    pub fn from_config(
        config: &Config,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(&config.api_base_url, config.timeout())
            .context("Failed to create API transport")?;
        let pipeline = Pipeline::new(transport, session, notifier, navigator, LOGIN_ROUTE);
        Ok(Self::new(pipeline, config.timeout()))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(pipeline: Pipeline<T>, timeout: Duration) -> Self {
        Self { pipeline, timeout }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.pipeline.session()
    }

    /// Send a raw call with the client's timeout.
    pub async fn send(&self, call: OutboundCall) -> Outcome {
        self.pipeline.send(call.with_timeout(self.timeout)).await
    }

    async fn request<R: DeserializeOwned>(&self, call: OutboundCall) -> Result<R, ApiError> {
        let response = self.send(call).await?;
        R::deserialize(&response.body).map_err(|e| ApiError::invalid_response(e, &response.body))
    }

    /// Serialize a request body. A body that cannot be encoded is a request
    /// construction failure and is reported like one.
    fn encode<B: Serialize>(&self, body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body).map_err(|e| {
            let failure = RequestFailure::RequestConstruction(format!("Failed to encode body: {}", e));
            ApiError::from(self.pipeline.report(failure))
        })
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.request(OutboundCall::get(path)).await
    }

    pub async fn post<R: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let body = self.encode(body)?;
        self.request(OutboundCall::post(path, body)).await
    }

    pub async fn put<R: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let body = self.encode(body)?;
        self.request(OutboundCall::put(path, body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(OutboundCall::delete(path)).await?;
        Ok(())
    }

    // ===== Session =====

    /// Sign in and start a session in the chosen scope.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        persistence: Persistence,
    ) -> Result<UserProfile, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post(LOGIN_PATH, &request).await?;

        let profile = UserProfile::from(&response);
        let session = self.session();
        session
            .set(&response.token, persistence)
            .map_err(ApiError::Session)?;
        session
            .set_user(&profile, persistence)
            .map_err(ApiError::Session)?;

        info!(username = %profile.username, ?persistence, "Signed in");
        Ok(profile)
    }

    pub fn logout(&self) {
        self.session().clear();
        info!("Signed out");
    }

    // ===== Customers =====

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        let customers: CustomerPage = self.get(CUSTOMERS_PATH).await?;
        let customers = customers.into_vec();
        debug!("Fetched {} customers", customers.len());
        Ok(customers)
    }

    pub async fn get_customer(&self, id: i64) -> Result<Customer, ApiError> {
        self.get(&format!("{}{}/", CUSTOMERS_PATH, id)).await
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, ApiError> {
        self.post(CUSTOMERS_PATH, customer).await
    }

    pub async fn calculate_quote(&self, customer_id: i64, request: &QuoteRequest) -> Result<QuoteResult, ApiError> {
        self.post(&format!("{}{}/calculate_quote/", CUSTOMERS_PATH, customer_id), request)
            .await
    }
}

/// Customer listings come back bare or wrapped in a paginated envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CustomerPage {
    Paginated { results: Vec<Customer> },
    Plain(Vec<Customer>),
}

impl CustomerPage {
    fn into_vec(self) -> Vec<Customer> {
        match self {
            CustomerPage::Paginated { results } => results,
            CustomerPage::Plain(customers) => customers,
        }
    }
}
