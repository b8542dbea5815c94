use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

use clap::Parser;
use tracing::Level;

use mainline_store::{
    health, Config, ErrorSpecific, Id, ImmutableItem, MemoryStore, MutableItem, Node, SigningKey,
    Store,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Value to store.
    #[arg(long, default_value = "Hello world!")]
    value: String,
    /// Optional salt for the mutable item.
    #[arg(long)]
    salt: Option<String>,
    /// Sequence number of the mutable item.
    #[arg(long, default_value_t = 1)]
    seq: u64,
}

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::TRACE).init();

    let cli = Cli::parse();
    let config = Config::default();

    let store = MemoryStore::with_config(&config.store);

    let immutable = ImmutableItem::new(cli.value.as_bytes()).expect("value too large");
    println!("Immutable target: {}", immutable.target());
    store.put(immutable.into()).expect("put immutable");

    let signer = SigningKey::from_bytes(&rand::random::<[u8; 32]>());
    let salt = cli.salt.as_deref().map(str::as_bytes);

    let item = MutableItem::new(&signer, cli.value.as_bytes(), cli.seq, salt, None)
        .expect("value or salt too large");
    println!("Mutable target: {} seq: {}", item.target(), item.seq());
    store.put(item.clone().into()).expect("put mutable");

    let stale = MutableItem::new(&signer, b"stale", cli.seq, salt, None).expect("valid item");
    if let Err(error) = store.put(stale.into()) {
        let response = ErrorSpecific::from(&error);
        println!("Rejected stale item: {} ({})", response.description, response.code);
    }

    let stored = store.get(item.target()).expect("get mutable");
    println!("Stored: {:?}", stored.map(|item| item.value().to_vec()));

    let address: SocketAddr = "84.124.73.14:6881".parse().expect("valid address");
    let mut node = Node::new(Id::from_ip(address.ip()), address);

    let now = Instant::now();
    println!(
        "New node: {:?}",
        health::health(&node.activity(), now, &config.health)
    );

    node.received_response(now);
    println!(
        "After a response: {:?}, secure: {}",
        health::health(&node.activity(), now, &config.health),
        node.is_secure()
    );
    println!(
        "20 minutes later: {:?}",
        health::health(
            &node.activity(),
            now + Duration::from_secs(20 * 60),
            &config.health
        )
    );

    for _ in 0..config.health.max_consecutive_failures {
        node.failed_to_respond();
    }
    println!(
        "After {} timeouts: {:?}",
        node.consecutive_failures(),
        health::health(&node.activity(), now, &config.health)
    );
}
