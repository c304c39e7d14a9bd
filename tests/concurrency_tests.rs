//! Concurrent use of a single client

use async_trait::async_trait;
use bsvalias::{types::*, IdentityClient, Result, Signer, Transport};
use secp256k1::SecretKey;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Echoes the sender handle back as a one byte script per call
#[derive(Debug, Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for CountingTransport {
    async fn post_json(&self, _url: &str, body: &Value) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let amount = body["amount"].as_u64().unwrap_or_default();
        Ok(json!({ "output": format!("{:02x}", amount % 256) }))
    }
}

fn identity() -> Identity {
    let site = Site::new(
        Capabilities::default().with_payment_destination("https://{domain.tld}/p2p/{alias}"),
    );
    Identity::from_handle("alice@example.com", site).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signed_requests() {
    let client = IdentityClient::with_transport(CountingTransport::default());
    let key = bitcoin::PrivateKey::new(
        SecretKey::from_slice(&[0x07; 32]).unwrap(),
        bitcoin::Network::Bitcoin,
    );
    let requests = 64u64;
    let start = Instant::now();

    let mut handles = Vec::new();
    for amount in 1..=requests {
        let client = client.clone();
        let key = key;
        handles.push(tokio::spawn(async move {
            let script = client
                .get_payment_destination(
                    &identity(),
                    &Sender::new("Bob", "bob@example.com"),
                    "tip",
                    amount,
                    Signer::Key(&key),
                )
                .await
                .unwrap();
            (amount, script)
        }));
    }

    for handle in handles {
        let (amount, script) = handle.await.unwrap();
        assert_eq!(script.as_bytes(), &[(amount % 256) as u8]);
    }

    assert_eq!(client.transport().calls.load(Ordering::SeqCst), requests as usize);
    println!("{} signed requests in {:?}", requests, start.elapsed());
}
