use {
    std::{net::SocketAddr, sync::Arc},
    tracing::{info, error},
    tokio::net::TcpListener,
    hyper::server::conn::http1,
    hyper_util::rt::tokio::{TokioIo, TokioTimer},
    rayon::{ThreadPool, ThreadPoolBuilder},
    crate::{
        handler::CounterHandler,
        http::HttpHandler,
        metrics::Metrics,
        table::BoxedTable,
    },
};

/// The running service: the counter handler plus the plumbing that feeds it
/// requests. Cheap to clone, everything lives behind one `Arc`.
#[derive(Clone)]
pub struct Tally {
    pub(crate) engine: Arc<Engine>,
}

pub(crate) struct Engine {
    pub(crate) handler: CounterHandler,
    pub(crate) thread_pool: ThreadPool,
    pub(crate) metrics: Metrics,
}

impl Tally {
    pub fn new(table: BoxedTable) -> Self {
        Self {
            engine: Arc::new(Engine {
                handler: CounterHandler::new(table),
                thread_pool: ThreadPoolBuilder::new().build().unwrap(),
                metrics: Metrics::new(),
            }),
        }
    }

    pub async fn run_http(&self, port: u16) {
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let listener = TcpListener::bind(addr).await.unwrap();

        let http_handler = HttpHandler::new(self.clone());

        info!("serving visitor counter on {addr:?}");
        loop {
            let (tcp, _) = listener.accept().await.unwrap();
            let io = TokioIo::new(tcp);

            let http_handler = http_handler.clone();
            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .serve_connection(io, http_handler)
                    .await {
                        if err.is_timeout() {
                            // ignore timeouts, because those can be caused by client
                        } else {
                            error!("error while handling http request: {err:?}");
                        }
                    }
            });
        }
    }
}
