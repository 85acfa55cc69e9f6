use crate::{error::ApiError, Error};
use reqwest::Response;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

/// Common wrapper around every Sbanken API response body.
///
/// Failures are signalled through `isError` even when the HTTP status is `200 OK`,
/// so the flag is checked before the payload is deserialized into typed values.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope {
    is_error: bool,
    error_type: Option<String>,
    error_message: Option<String>,
    item: Option<Value>,
    items: Option<Value>,
    #[serde(skip)]
    status: u16,
}

impl Envelope {
    /// Reads and parses the body of `res`.
    pub(crate) async fn from_response(res: Response) -> Result<Self, Error> {
        let status = res.status().as_u16();
        let bytes = res.bytes().await?;

        let mut envelope: Envelope = serde_json::from_slice(&bytes)?;
        envelope.status = status;

        Ok(envelope)
    }

    /// Unwraps the single `item` payload.
    pub(crate) fn into_item<T: DeserializeOwned>(self) -> Result<T, Error> {
        self.check()?;

        let item = self
            .item
            .ok_or_else(|| <serde_json::Error as serde::de::Error>::missing_field("item"))?;

        Ok(serde_json::from_value(item)?)
    }

    /// Unwraps the `items` payload. A missing list is treated as empty.
    pub(crate) fn into_items<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        self.check()?;

        match self.items {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items) => Ok(serde_json::from_value(items)?),
        }
    }

    /// Unwraps the `items` payload of a list requested with `?length=`, keeping at most
    /// `length` entries in the order returned by the API.
    pub(crate) fn into_bounded_items<T: DeserializeOwned>(
        self,
        length: u32,
    ) -> Result<Vec<T>, Error> {
        let mut items = self.into_items()?;

        let length = usize::try_from(length).unwrap_or(usize::MAX);
        if items.len() > length {
            tracing::debug!(
                "API returned {} items, truncating to the requested {}",
                items.len(),
                length
            );
            items.truncate(length);
        }

        Ok(items)
    }

    fn check(&self) -> Result<(), ApiError> {
        if !self.is_error {
            return Ok(());
        }

        tracing::debug!(
            "API reported an error: {:?} {:?}",
            self.error_type,
            self.error_message
        );

        Err(ApiError {
            error_type: self.error_type.clone().unwrap_or_default(),
            error_message: self.error_message.clone().unwrap_or_default(),
            status: self.status,
        })
    }
}
