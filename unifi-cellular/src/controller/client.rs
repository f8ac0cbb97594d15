use super::{
    types::{Device, Envelope, HealthSubsystem},
    Controller,
};
use crate::{settings::Settings, Error};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const API_KEY_HEADER: &str = "X-API-Key";
const USER_AGENT: &str = concat!("unifi-cellular/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the UniFi Network application's legacy `stat` API.
#[derive(Debug, Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: Url,
    devices_url: Url,
    health_url: Url,
}

impl ControllerClient {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let base_url = base_url(&settings.host)?;
        let endpoint = |resource: &str| {
            base_url
                .join(&format!(
                    "proxy/network/api/s/{}/stat/{resource}",
                    settings.site
                ))
                .map_err(|source| Error::InvalidHost {
                    host: settings.host.clone(),
                    source,
                })
        };
        let devices_url = endpoint("device")?;
        let health_url = endpoint("health")?;

        let http = build_http_client(settings.request_timeout, settings.verify_ssl)
            .map_err(Error::Communication)?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            base_url,
            devices_url,
            health_url,
        })
    }

    /// Root URL of the controller, used as the device's configuration URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Like [`Controller::fetch_devices`], but reports an unknown site as
    /// [`Error::SiteNotFound`]. Used when validating a new configuration.
    pub async fn probe_devices(&self) -> Result<Vec<Device>, Error> {
        let resp = self.devices_response().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::SiteNotFound);
        }

        parse_devices(resp).await
    }

    async fn devices_response(&self) -> Result<Response, Error> {
        let resp = self
            .get(&self.devices_url)
            .await
            .map_err(Error::Communication)?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication);
        }

        Ok(resp)
    }

    async fn get(&self, url: &Url) -> reqwest::Result<Response> {
        self.http
            .get(url.clone())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
    }
}

#[async_trait]
impl Controller for ControllerClient {
    #[instrument(skip(self), fields(url = %self.devices_url))]
    async fn fetch_devices(&self) -> Result<Vec<Device>, Error> {
        let resp = self.devices_response().await?;

        parse_devices(resp).await
    }

    #[instrument(skip(self), fields(url = %self.health_url))]
    async fn fetch_health(&self) -> Vec<HealthSubsystem> {
        let resp = match self.get(&self.health_url).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("health request failed, skipping WAN stats: {e}");
                return Vec::new();
            }
        };

        if resp.status() != StatusCode::OK {
            warn!(
                "health request returned {}, skipping WAN stats",
                resp.status()
            );
            return Vec::new();
        }

        match resp.json::<Envelope<Value>>().await {
            Ok(envelope) => HealthSubsystem::parse_all(envelope.data),
            Err(e) => {
                warn!("failed to decode health response, skipping WAN stats: {e}");
                Vec::new()
            }
        }
    }
}

async fn parse_devices(resp: Response) -> Result<Vec<Device>, Error> {
    let envelope: Envelope<Device> = resp
        .error_for_status()
        .map_err(Error::Communication)?
        .json()
        .await
        .map_err(Error::Communication)?;

    debug!("controller reported {} devices", envelope.data.len());

    Ok(envelope.data)
}

/// `host` is normally a bare address (`192.168.1.1`, `unifi.lan:8443`), which is
/// reached over https. An explicit `http://` or `https://` scheme is honored.
fn base_url(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    let raw = if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/")
    } else {
        format!("https://{host}/")
    };

    Url::parse(&raw).map_err(|source| Error::InvalidHost {
        host: host.to_owned(),
        source,
    })
}

fn build_http_client(
    timeout: Duration,
    verify_ssl: bool,
) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        // UniFi consoles ship with self-signed certificates.
        .danger_accept_invalid_certs(!verify_ssl)
        .build()
}
