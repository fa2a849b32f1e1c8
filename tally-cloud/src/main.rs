use {
    clap::Parser,
    tally_cloud::{
        Tally,
        config::{Config, kv_from_config},
        handler::TABLE_NAME,
        storage::NamespacedStorage,
        table::{BoxedTable, KvTable},
    },
};

#[derive(Parser)]
struct Args {
    #[arg(long, default_value = "tally.yaml")]
    config: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    let config = match Config::load(&args.config) {
        Ok(v) => v,
        Err(err) => panic!("failed to load config from {}: {err}", args.config),
    };

    let storage = match kv_from_config(&config.kv) {
        Ok(v) => v,
        Err(err) => panic!("failed to init kv storage: {err}"),
    };
    let table = BoxedTable::new(KvTable::new(NamespacedStorage::new(TABLE_NAME, storage)));

    let tally = Tally::new(table);
    match config.metrics {
        Some(metrics) => {
            tokio::join!(
                tally.run_http(config.http.port),
                tally.run_metrics_server(metrics.port),
            );
        },
        None => tally.run_http(config.http.port).await,
    }
}
