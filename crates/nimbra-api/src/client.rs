// Async HTTP client for the Nimbra Vision element gateway.
//
// Base path: {gateway}/api/elements/{element}/
// Auth: optional bearer token (see TransportConfig)

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::{
    CreateCircuitFields, ElementInfo, InterAppMessage, InterAppResponse, ParameterValue, Row,
    TableResponse,
};
use crate::tables;
use crate::transport::TransportConfig;

// ── Error response shape from the gateway ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client bound to one Nimbra Vision element behind the gateway.
///
/// Every call is a fresh request; nothing read from the element is
/// cached, since circuit tables change underneath us.
pub struct VisionClient {
    http: reqwest::Client,
    base_url: Url,
    element: String,
    timeout_secs: u64,
}

impl VisionClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a gateway URL, element name and transport config.
    pub fn new(base_url: &str, element: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::from_reqwest(base_url, element, http)?;
        client.timeout_secs = transport.timeout.as_secs();
        Ok(client)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, element: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            http,
            base_url,
            element: element.to_owned(),
            timeout_secs: 30,
        })
    }

    /// The element this client talks to.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/api/elements/{element}/{tail..}` with every segment
    /// percent-encoded (element names routinely contain spaces).
    fn url(&self, tail: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments
                .pop_if_empty()
                .extend(["api", "elements", self.element.as_str()])
                .extend(tail);
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await.map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        Self::handle_response(resp).await
    }

    async fn post_no_response<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), Error> {
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    fn map_send(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| if raw.is_empty() { status.to_string() } else { raw });

        Error::Gateway {
            status: status.as_u16(),
            message,
        }
    }

    // ── Element ──────────────────────────────────────────────────────

    /// Fetch the element header (name and state).
    pub async fn get_element(&self) -> Result<ElementInfo, Error> {
        let url = self.url(&[])?;
        match self.get(url).await {
            Err(Error::Gateway { status: 404, .. }) => Err(Error::ElementNotFound {
                name: self.element.clone(),
            }),
            other => other,
        }
    }

    // ── Tables ───────────────────────────────────────────────────────

    /// Read every row of the table with the given parameter id.
    pub async fn read_table(&self, pid: u32) -> Result<Vec<Row>, Error> {
        let pid = pid.to_string();
        let url = self.url(&["tables", &pid])?;
        let table: TableResponse = self.get(url).await?;
        if !table.success {
            return Err(Error::Rejected {
                message: table
                    .message
                    .unwrap_or_else(|| format!("table {pid} could not be read")),
            });
        }
        debug!(pid = %pid, rows = table.data.len(), "table read");
        Ok(table.data)
    }

    // ── Parameters ───────────────────────────────────────────────────

    /// Write a string value to a parameter.
    pub async fn set_parameter(&self, pid: u32, value: &str) -> Result<(), Error> {
        let pid = pid.to_string();
        let url = self.url(&["parameters", &pid])?;
        self.post_no_response(url, &ParameterValue { value }).await
    }

    /// Serialize a creation request and write it to the creation parameter.
    pub async fn create_circuit(&self, fields: &CreateCircuitFields) -> Result<(), Error> {
        let payload = serde_json::to_string(fields).map_err(|e| Error::Deserialization {
            message: format!("failed to serialize creation request: {e}"),
            body: String::new(),
        })?;
        debug!(payload = %payload, "submitting circuit creation request");
        self.set_parameter(tables::CREATE_CIRCUIT, &payload).await
    }

    // ── Inter-app ────────────────────────────────────────────────────

    /// Deliver an inter-app message; a `success: false` reply is an error.
    pub async fn send_interapp(&self, message: &InterAppMessage) -> Result<InterAppResponse, Error> {
        let url = self.url(&["interapp"])?;
        let resp: InterAppResponse = self.post(url, message).await?;
        if resp.success {
            Ok(resp)
        } else {
            Err(Error::Rejected {
                message: resp
                    .message
                    .unwrap_or_else(|| "inter-app message was not accepted".into()),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_element_segment() {
        let client =
            VisionClient::from_reqwest("https://gw.example:8443/", "Nimbra Vision", reqwest::Client::new())
                .unwrap();
        let url = client.url(&["tables", "1800"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gw.example:8443/api/elements/Nimbra%20Vision/tables/1800"
        );
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let client =
            VisionClient::from_reqwest("https://gw.example/dm", "vision", reqwest::Client::new()).unwrap();
        let url = client.url(&["interapp"]).unwrap();
        assert_eq!(url.as_str(), "https://gw.example/dm/api/elements/vision/interapp");
    }

    #[test]
    fn rejects_cannot_be_a_base_urls() {
        assert!(VisionClient::from_reqwest("mailto:ops@example.com", "x", reqwest::Client::new()).is_err());
    }
}
