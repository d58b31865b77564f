#![allow(dead_code)]

pub use sigbridge_test_utils::init_tracing;

use std::time::Duration;

/// Run a future with a 20-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(20), f)
        .await
        .expect("Test timed out after 20 seconds")
}
