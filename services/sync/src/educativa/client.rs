use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::parse::tag_text;

pub const SOAP_NAMESPACE: &str = "urn:Educativa/Aula";

/// Fault raised by per-student queries for users the platform no
/// longer knows. Expected steady state, not an error.
const MISSING_USER_FAULT: &str = "UsuarioInexistente";

#[derive(Debug, Clone)]
pub struct EducativaConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl EducativaConfig {
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("EDUCATIVA_BASE_URL").ok()?;
        let username = std::env::var("EDUCATIVA_USER").ok()?;
        let password = std::env::var("EDUCATIVA_PASSWORD").ok()?;
        let timeout_secs = std::env::var("EDUCATIVA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Some(Self {
            base_url,
            username,
            password,
            timeout_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EducativaClientError {
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SOAP fault from {method}: {detail}")]
    Fault { method: String, detail: String },
}

#[derive(Clone)]
pub struct EducativaClient {
    http: Client,
    config: EducativaConfig,
}

impl EducativaClient {
    pub fn new(config: EducativaConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// For testing: point the client at a wiremock server.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// One SOAP call. The envelope is assembled by hand: the platform
    /// publishes no usable WSDL and its responses carry no stable
    /// schema, so nothing here round-trips through a real SOAP stack.
    pub async fn call(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<String, EducativaClientError> {
        let envelope = build_envelope(method, params);
        let url = format!("{}/soap/", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Content-Type", "text/xml")
            .header("SOAPAction", format!("\"{SOAP_NAMESPACE}#{method}\""))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EducativaClientError::Http { status, body });
        }

        // Fault detection is substring-based on purpose: fault payloads
        // from this endpoint are not reliably well-formed XML.
        if body.contains("faultstring") {
            if body.contains(MISSING_USER_FAULT) {
                return Ok(String::new());
            }
            return Err(EducativaClientError::Fault {
                method: method.to_string(),
                detail: fault_detail(&body),
            });
        }

        Ok(body)
    }
}

fn build_envelope(method: &str, params: &[(&str, String)]) -> String {
    let mut args = String::new();
    for (name, value) in params {
        args.push_str(&format!(
            "<aula:{name}>{}</aula:{name}>",
            xml_escape(value)
        ));
    }

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\" ",
            "xmlns:aula=\"{ns}\">",
            "<soapenv:Body>",
            "<aula:{method}>{args}</aula:{method}>",
            "</soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        ns = SOAP_NAMESPACE,
        method = method,
        args = args,
    )
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn fault_detail(body: &str) -> String {
    match tag_text(body, "faultstring") {
        Some(text) => text.to_string(),
        None => body.chars().take(200).collect(),
    }
}
