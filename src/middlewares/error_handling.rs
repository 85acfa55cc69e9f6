use crate::error::{ApiError, Error};
use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Reqwest middleware which translates non-success responses returned from Sbanken APIs
/// into [`Error`](crate::error::Error)s.
///
/// Successful responses are passed through untouched: envelope errors delivered with
/// a `200 OK` are unwrapped by the API clients.
pub struct ErrorHandlingMiddleware;

#[async_trait]
impl Middleware for ErrorHandlingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        // Capture the response
        let response = next.run(req, extensions).await?;

        if !response.status().is_success() {
            tracing::debug!("Failed HTTP request. Status code: {}", response.status());

            return Err(error_from_response(response).await?.into());
        }

        Ok(response)
    }
}

/// Body of an error response from Sbanken APIs.
#[derive(serde::Deserialize, Debug)]
#[serde(untagged)]
enum ErrorResponseBody {
    Envelope {
        #[serde(rename = "isError")]
        is_error: bool,
        #[serde(rename = "errorType")]
        error_type: Option<String>,
        #[serde(rename = "errorMessage")]
        error_message: Option<String>,
    },
    OAuth {
        error: String,
        error_description: Option<String>,
    },
    Unknown,
}

async fn error_from_response(response: Response) -> reqwest_middleware::Result<Error> {
    let status = response.status();

    // Parse the response body as JSON
    let bytes = response.bytes().await?;
    let error_response: ErrorResponseBody =
        serde_json::from_slice(&bytes).unwrap_or(ErrorResponseBody::Unknown);

    let error = match error_response {
        ErrorResponseBody::Envelope {
            is_error: true,
            error_type,
            error_message,
        } => Error::ApiError(ApiError {
            error_type: error_type.unwrap_or_else(|| canonical_reason(status)),
            error_message: error_message.unwrap_or_default(),
            status: status.as_u16(),
        }),
        ErrorResponseBody::OAuth {
            error,
            error_description,
        } => Error::ApiError(ApiError {
            error_type: error,
            error_message: error_description.unwrap_or_default(),
            status: status.as_u16(),
        }),
        ErrorResponseBody::Envelope { .. } | ErrorResponseBody::Unknown => {
            Error::UnexpectedStatus(status.as_u16())
        }
    };

    Ok(error)
}

fn canonical_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}
