//! Scripted [`HttpTransport`] double shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use crate::transport::http::{BoxError, BoxFuture, HttpRequest, HttpResponse, HttpTransport};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Respond(HttpResponse),
    RespondAfter(Duration, HttpResponse),
    Fail(&'static str),
    Hang,
}

impl Scripted {
    pub(crate) fn json(status: u16, body: Value) -> Self {
        Self::Respond(HttpResponse {
            status,
            headers: vec![("content-type".to_owned(), "application/json".to_owned())],
            body: body.to_string(),
        })
    }

    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse {
            status,
            headers: vec![("content-type".to_owned(), "text/plain".to_owned())],
            body: body.to_owned(),
        })
    }

    pub(crate) fn status(status: u16) -> Self {
        Self::Respond(HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        })
    }

    pub(crate) fn after(self, delay: Duration) -> Self {
        match self {
            Self::Respond(response) => Self::RespondAfter(delay, response),
            other => other,
        }
    }
}

type Handler = dyn Fn(&HttpRequest) -> Scripted + Send + Sync;

#[derive(Clone)]
pub(crate) struct FakeTransport {
    handler: Arc<Handler>,
    state: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Default)]
struct FakeState {
    requests: Vec<HttpRequest>,
    in_flight: usize,
    max_in_flight: usize,
}

impl FakeTransport {
    /// Answer each request by calling `handler`.
    pub(crate) fn with_handler(
        handler: impl Fn(&HttpRequest) -> Scripted + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Answer requests with `script` in order; extra requests fail.
    pub(crate) fn sequence(script: Vec<Scripted>) -> Self {
        let script = Mutex::new(VecDeque::from(script));
        Self::with_handler(move |_| {
            script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Scripted::Fail("no scripted response left"))
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

/// Decrements the in-flight counter even when the request future is dropped mid-flight.
struct InFlight(Arc<Mutex<FakeState>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.lock().unwrap().in_flight -= 1;
    }
}

impl HttpTransport for FakeTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let scripted = (self.handler)(&request);
            {
                let mut state = self.state.lock().unwrap();
                state.requests.push(request);
                state.in_flight += 1;
                state.max_in_flight = state.max_in_flight.max(state.in_flight);
            }
            let _guard = InFlight(Arc::clone(&self.state));

            match scripted {
                Scripted::Respond(response) => Ok(response),
                Scripted::RespondAfter(delay, response) => {
                    tokio::time::sleep(delay).await;
                    Ok(response)
                }
                Scripted::Fail(cause) => Err(cause.into()),
                Scripted::Hang => std::future::pending().await,
            }
        })
    }
}
