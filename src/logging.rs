use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// `RUST_LOG`이 없을 때 사용하는 기본 필터.
pub const DEFAULT_FILTER: &str = "feature_runner=info,warn";

/// tracing 구독자를 초기화한다.
///
/// 이미 전역 구독자가 설치되어 있으면 아무것도 하지 않는다.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}
