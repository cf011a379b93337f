//! This module provides a client to connect to an Axema booking server

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::booking::{BookingView, BookingViewRequest, LoginRequest, Nonce, Object, OwnedReservations};
use crate::cache::ResponseCache;
use crate::digest::fingerprint;
use crate::error::{Error, Result};
use crate::traits::{RawResponse, Transport};

pub const NONCE_ENDPOINT: &str = "/fcgi_reservation/get_nonce";
pub const LOGIN_ENDPOINT: &str = "/fcgi_reservation/login";
pub const BOOKING_VIEW_ENDPOINT: &str = "/fcgi_reservation/request_booking_view";
pub const OWNED_RESERVATIONS_ENDPOINT: &str = "/fcgi_reservation/request_owned_reservations";

/// The server answers a successful status even for rejected credentials, with this text in the body
pub const WRONG_LOGIN_MARKER: &str = "wrong_login";

const OBJECTS_CACHE_KEY: &str = "request_booking_view.json";
const OWNED_RESERVATIONS_CACHE_KEY: &str = "request_owned_reservations.json";

fn booking_view_cache_key(object_id: i64) -> String {
    format!("request_booking_view_{}.json", object_id)
}


/// A [`Transport`] backed by `reqwest`, that keeps the session cookies between requests
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, json_body: Option<Vec<u8>>) -> Result<RawResponse> {
        let mut request = self.http.post(url);
        if let Some(body) = json_body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=UTF-8")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// A session with a booking server.
///
/// Call [`Client::login`] before anything else. Read requests are refused until it succeeds.
pub struct Client<T: Transport> {
    transport: T,
    endpoint: String,
    username: String,
    password: String,
    cache: ResponseCache,
    state: SessionState,
}

impl<T: Transport> Client<T> {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, U: ToString, P: ToString>(transport: T, endpoint: S, username: U, password: P, cache: ResponseCache) -> Self {
        Self {
            transport,
            endpoint: endpoint.as_ref().trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            cache,
            state: SessionState::Unauthenticated,
        }
    }

    /// The base URL of the server, without trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn post(&self, endpoint: &str, json_body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.endpoint, endpoint);
        log::debug!("POST {}", url);

        let response = self.transport.post(&url, json_body).await?;
        if response.is_success() == false {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        Ok(response.body)
    }

    fn ensure_authenticated(&self) -> Result<()> {
        match self.state {
            SessionState::Authenticated => Ok(()),
            SessionState::Unauthenticated => Err(Error::NotAuthenticated),
        }
    }

    /// Ask the server for a fresh login challenge
    pub async fn nonce(&self) -> Result<Nonce> {
        let body = self.post(NONCE_ENDPOINT, None).await?;
        decode(NONCE_ENDPOINT, &body)
    }

    /// Authenticate. On success, the session cookies are kept by the transport
    pub async fn login(&mut self) -> Result<()> {
        self.state = SessionState::Unauthenticated;

        let nonce = self.nonce().await?;
        let payload = login_request(nonce, &self.username, &self.password);
        let body = to_json(LOGIN_ENDPOINT, &payload)?;

        let response = self.post(LOGIN_ENDPOINT, Some(body)).await?;
        let text = String::from_utf8_lossy(&response);
        if text.contains(WRONG_LOGIN_MARKER) {
            return Err(Error::Login(text.into_owned()));
        }

        log::info!("Logged in to {}", self.endpoint);
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// The bookable objects. This is served from the local cache once it has been downloaded
    pub async fn objects(&self) -> Result<Vec<Object>> {
        self.ensure_authenticated()?;
        let body = self.cache.fetch_cached(OBJECTS_CACHE_KEY, || {
            self.post(BOOKING_VIEW_ENDPOINT, None)
        }).await?;
        decode(BOOKING_VIEW_ENDPOINT, &body)
    }

    /// The schedule of an object. This is served from the local cache once it has been downloaded
    pub async fn booking_view(&self, object_id: i64) -> Result<BookingView> {
        self.ensure_authenticated()?;
        let request = to_json(BOOKING_VIEW_ENDPOINT, &BookingViewRequest { reservation_object_id: object_id })?;
        let body = self.cache.fetch_cached(&booking_view_cache_key(object_id), || {
            self.post(BOOKING_VIEW_ENDPOINT, Some(request))
        }).await?;
        decode(BOOKING_VIEW_ENDPOINT, &body)
    }

    /// The reservations of the logged-in user, always fetched from the server
    pub async fn owned_reservations(&self) -> Result<OwnedReservations> {
        self.ensure_authenticated()?;
        let body = self.post(OWNED_RESERVATIONS_ENDPOINT, None).await?;
        decode(OWNED_RESERVATIONS_ENDPOINT, &body)
    }

    /// Same as [`Client::owned_reservations`], but served from the local cache once downloaded.
    ///
    /// New reservations will not show up until the cache file is deleted.
    pub async fn cached_owned_reservations(&self) -> Result<OwnedReservations> {
        self.ensure_authenticated()?;
        let body = self.cache.fetch_cached(OWNED_RESERVATIONS_CACHE_KEY, || {
            self.post(OWNED_RESERVATIONS_ENDPOINT, None)
        }).await?;
        decode(OWNED_RESERVATIONS_ENDPOINT, &body)
    }
}

/// Build the answer to a login challenge
pub fn login_request(nonce: Nonce, username: &str, password: &str) -> LoginRequest {
    let user = fingerprint(format!("{}{}", nonce.nonce1, username));
    let pass = fingerprint(format!("{}{}{}", nonce.nonce2, username, password));
    LoginRequest {
        nonce1: nonce.nonce1,
        nonce2: nonce.nonce2,
        pass,
        user,
    }
}

fn decode<D: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<D> {
    serde_json::from_slice(body).map_err(|source| Error::Json { endpoint: endpoint.to_string(), source })
}

fn to_json<S: serde::Serialize>(endpoint: &str, payload: &S) -> Result<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|source| Error::Json { endpoint: endpoint.to_string(), source })
}
