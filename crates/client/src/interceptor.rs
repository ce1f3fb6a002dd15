//! Request interceptor applied to every outbound call.
//!
//! Wraps a transport service (see [`crate::transport`]) and, per request:
//!
//! - attaches the session token as the `Authorization` header;
//! - holds an [`InFlightGuard`] until the response or error is observed;
//! - on a 401 while logged in, logs the user out once and still returns the
//!   original error to the caller.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

use crate::account::AccountFlow;
use crate::busy::{InFlightGuard, InFlightTracker};
use crate::config::InterceptorConfig;
use crate::session::SessionStore;
use crate::transport::TransportError;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tower layer installing [`InterceptorService`].
#[derive(Clone)]
pub struct InterceptorLayer {
    session: SessionStore,
    tracker: InFlightTracker,
    account: AccountFlow,
    config: InterceptorConfig,
}

impl InterceptorLayer {
    pub fn new(account: AccountFlow, tracker: InFlightTracker, config: InterceptorConfig) -> Self {
        Self {
            session: account.session().clone(),
            tracker,
            account,
            config,
        }
    }

    pub fn tracker(&self) -> &InFlightTracker {
        &self.tracker
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = InterceptorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorService {
            inner,
            layer: self.clone(),
        }
    }
}

/// Service wrapper for [`InterceptorLayer`].
#[derive(Clone)]
pub struct InterceptorService<S> {
    inner: S,
    layer: InterceptorLayer,
}

impl<S> InterceptorService<S> {
    fn authorization_value(&self) -> Option<HeaderValue> {
        let token = self.layer.session.token().unwrap_or_default();
        if token.is_empty() && !self.layer.config.attach_empty_token {
            return None;
        }

        let raw = match (&self.layer.config.auth_scheme, token.is_empty()) {
            (Some(scheme), false) => format!("{scheme} {token}"),
            _ => token,
        };

        match HeaderValue::from_str(&raw) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(_) => {
                tracing::warn!("session token is not a valid header value; sending empty authorization");
                Some(HeaderValue::from_static(""))
            }
        }
    }
}

impl<S, B, R> Service<http::Request<B>> for InterceptorService<S>
where
    S: Service<http::Request<B>, Response = http::Response<R>, Error = TransportError>,
{
    type Response = http::Response<R>;
    type Error = TransportError;
    type Future = InterceptorFuture<tracing::instrument::Instrumented<S::Future>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        let request_id = Uuid::now_v7();
        let span = tracing::debug_span!(
            "request",
            %request_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        if let Some(value) = self.authorization_value() {
            req.headers_mut().insert(AUTHORIZATION, value);
        }
        if self.layer.config.propagate_request_id {
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                req.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
        }

        let guard = self.layer.tracker.acquire(&req.uri().to_string());
        let fut = {
            let _entered = span.enter();
            tracing::trace!(visible = guard.is_visible(), "request sent");
            self.inner.call(req)
        };

        InterceptorFuture {
            inner: fut.instrument(span),
            guard: Some(guard),
            account: self.layer.account.clone(),
        }
    }
}

pin_project! {
    /// Future for [`InterceptorService`].
    pub struct InterceptorFuture<F> {
        #[pin]
        inner: F,
        guard: Option<InFlightGuard>,
        account: AccountFlow,
    }
}

impl<F, R> Future for InterceptorFuture<F>
where
    F: Future<Output = Result<http::Response<R>, TransportError>>,
{
    type Output = Result<http::Response<R>, TransportError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = match this.inner.poll(cx) {
            Poll::Ready(result) => result,
            Poll::Pending => return Poll::Pending,
        };

        if let Err(err) = &result {
            if err.is_unauthorized() {
                if !this.account.force_logout(err.message()) {
                    tracing::debug!("401 received with no live session; nothing to tear down");
                }
            } else {
                tracing::debug!(error = %err, "request failed");
            }
        }

        // Release after the outcome has been handled.
        drop(this.guard.take());
        Poll::Ready(result)
    }
}
