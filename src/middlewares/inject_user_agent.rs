use crate::Error;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, USER_AGENT},
    Request, Response,
};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Product token of this crate, always part of the `User-Agent` header.
pub static USER_AGENT_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Sets `User-Agent` on every outgoing request.
///
/// The header is `sbanken-connector/<version>`, preceded by the host application's own
/// product token when one is configured (e.g. `home-dashboard/2.1 sbanken-connector/0.1.0`).
#[derive(Clone)]
pub struct InjectUserAgentMiddleware {
    user_agent: HeaderValue,
}

impl InjectUserAgentMiddleware {
    pub fn new(application: Option<&str>) -> Result<Self, Error> {
        let user_agent = match application.map(str::trim).filter(|a| !a.is_empty()) {
            None => HeaderValue::from_static(USER_AGENT_VALUE),
            Some(application) => {
                HeaderValue::from_str(&format!("{} {}", application, USER_AGENT_VALUE)).map_err(
                    |_| Error::InvalidConfig(format!("invalid application name {:?}", application)),
                )?
            }
        };

        Ok(Self { user_agent })
    }
}

#[async_trait]
impl Middleware for InjectUserAgentMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        req.headers_mut().insert(USER_AGENT, self.user_agent.clone());
        next.run(req, extensions).await
    }
}
