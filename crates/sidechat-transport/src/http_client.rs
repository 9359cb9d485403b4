use std::time::Duration;

use reqwest::Client;

const DISABLE_SYSTEM_PROXY_ENV: &str = "SIDECHAT_DISABLE_SYSTEM_PROXY";

// Streaming responses stay open indefinitely, so only the connect phase
// carries a timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_http_client() -> Client {
    let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
    if should_disable_system_proxy() {
        builder = builder.no_proxy();
    }
    builder.build().unwrap_or_default()
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}
