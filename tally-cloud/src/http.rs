use {
    std::{convert::Infallible, pin::Pin},
    tokio::sync::oneshot,
    hyper::{Request, Response, body::{Bytes, Incoming}},
    http_body_util::Full,
    tally_core::{HandlerResponse, InvocationContext, InvocationEvent},
    crate::Tally,
};

/// Bridges hyper's async world to the synchronous handler: each request is
/// dispatched onto the thread pool and answered through a oneshot channel.
#[derive(Clone)]
pub struct HttpHandler {
    tally: Tally,
}

impl HttpHandler {
    pub fn new(tally: Tally) -> Self {
        Self {
            tally,
        }
    }
}

impl hyper::service::Service<Request<Incoming>> for HttpHandler {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let (tx, rx) = oneshot::channel();
        let engine = self.tally.engine.clone();
        let event = invocation_event(&req);
        engine.clone().thread_pool.spawn(move || {
            engine.metrics.http_requests_in_flight.inc();

            let context = InvocationContext::new();
            let response = engine.handler.handle(&event, &context);

            engine.metrics.visits_total.inc();
            if response.status_code >= 500 {
                engine.metrics.handler_errors_total.inc();
            }
            engine.metrics.http_requests_in_flight.dec();

            tx.send(Ok(http_response(response))).unwrap();
        });

        Box::pin(async move { rx.await.unwrap() })
    }
}

fn invocation_event(req: &Request<Incoming>) -> InvocationEvent {
    let mut event = InvocationEvent::new()
        .with_method(req.method().clone())
        .with_path(req.uri().to_string());
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            event = event.with_header(name.as_str(), value);
        }
    }
    event
}

fn http_response(response: HandlerResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(response.status_code);
    for (name, value) in &response.headers {
        builder = builder.header(name, value);
    }
    builder.body(Full::new(Bytes::from(response.body))).unwrap()
}
