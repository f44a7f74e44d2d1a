use std::collections::HashMap;
use std::sync::Once;

use docgen_api::{Environment, ENV_ACCESS_KEY, ENV_MAX_TRIES, ENV_RETRY_DELAY_MS, ENV_URL};
use wiremock::{Mock, MockServer};

pub const ACCESS_KEY: &str = "test-key";

static TRACING: Once = Once::new();

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A mock service plus the runtime it runs on.
///
/// The client under test is blocking, so it runs on the test thread while
/// the mock server runs on the runtime's workers.
pub struct Harness {
    // Dropped before the runtime.
    pub server: MockServer,
    rt: tokio::runtime::Runtime,
}

impl Harness {
    pub fn start() -> Self {
        init_tracing();
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to build test runtime");
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    /// Check every mounted `expect(n)`; this is the network-call counter.
    pub fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }

    /// An environment pointing at the mock, with a short retry delay.
    pub fn environment(&self, max_tries: u32) -> Environment {
        let vars: HashMap<&str, String> = HashMap::from([
            (ENV_URL, format!("{}/api", self.server.uri())),
            (ENV_ACCESS_KEY, ACCESS_KEY.to_string()),
            (ENV_MAX_TRIES, max_tries.to_string()),
            (ENV_RETRY_DELAY_MS, "10".to_string()),
        ]);
        Environment::from_lookup(|name| vars.get(name).cloned())
            .expect("Failed to load test environment")
    }
}
