use super::events::{EngineEvent, ProgressEvent};
use super::result::RunResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// 진행 이벤트와 최종 결과를 받는 외부 리포터이다.
///
/// 엔진은 각 호출이 끝날 때까지 기다린 뒤 다음 단위로 진행한다.
/// 구현체는 자신의 실패를 스스로 처리해야 하며 엔진으로 오류를 돌려줄 수 없다.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// 진행 이벤트를 처리한다.
    async fn progress(&self, event: &ProgressEvent);

    /// 실행 종료 시 한 번 호출된다.
    async fn report(&self, result: &RunResult);
}

/// 아무것도 하지 않는 리포터이다.
#[derive(Debug, Default, Clone)]
pub struct NullReporter;

#[async_trait]
impl Reporter for NullReporter {
    async fn progress(&self, _event: &ProgressEvent) {}

    async fn report(&self, _result: &RunResult) {}
}

/// 여러 리포터에 등록 순서대로 이벤트를 전달한다.
#[derive(Default, Clone)]
pub struct Reporters {
    reporters: Vec<Arc<dyn Reporter>>,
}

impl Reporters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 리포터를 추가한다.
    pub fn with(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

#[async_trait]
impl Reporter for Reporters {
    async fn progress(&self, event: &ProgressEvent) {
        for reporter in &self.reporters {
            reporter.progress(event).await;
        }
    }

    async fn report(&self, result: &RunResult) {
        for reporter in &self.reporters {
            reporter.report(result).await;
        }
    }
}

/// 진행 상황을 tracing 로그로 남기는 리포터이다.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

#[async_trait]
impl Reporter for TracingReporter {
    async fn progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::StepFailed { .. } | ProgressEvent::Retry { .. } => {
                tracing::warn!(kind = event.kind(), info = ?event.info(), "progress");
            }
            _ => tracing::info!(kind = event.kind(), info = ?event.info(), "progress"),
        }
    }

    async fn report(&self, result: &RunResult) {
        let summary = result.summary();
        tracing::info!(
            success = result.success,
            run_time_ms = result.run_time.map(|d| d.as_millis() as u64),
            features_passed = summary.features.passed,
            features_failed = summary.features.failed,
            features_skipped = summary.features.skipped,
            scenarios_passed = summary.scenarios.passed,
            scenarios_failed = summary.scenarios.failed,
            scenarios_skipped = summary.scenarios.skipped,
            "feature run finished"
        );
        if let Some(err) = &result.error {
            tracing::error!(error = %err, "feature run aborted");
        }
    }
}

/// 이벤트를 tokio 채널로 중계하는 리포터이다.
///
/// 수신 측이 닫혀 있으면 이벤트는 버려진다.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: UnboundedSender<EngineEvent>,
}

impl ChannelReporter {
    pub fn new(sender: UnboundedSender<EngineEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Reporter for ChannelReporter {
    async fn progress(&self, event: &ProgressEvent) {
        let _ = self.sender.send(EngineEvent::Progress(event.clone()));
    }

    async fn report(&self, result: &RunResult) {
        let _ = self.sender.send(EngineEvent::RunFinished(result.clone()));
    }
}

/// Step 핸들러에 노출되는 진행 이벤트 송신기이다.
#[derive(Clone)]
pub struct ProgressSink {
    reporter: Arc<dyn Reporter>,
}

impl ProgressSink {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self { reporter }
    }

    /// 진행 이벤트를 보내고 리포터 처리가 끝날 때까지 기다린다.
    pub async fn send(&self, event: ProgressEvent) {
        self.reporter.progress(&event).await;
    }

    /// 임의 종류의 이벤트를 보낸다.
    pub async fn info(&self, kind: impl Into<String>, info: Option<String>) {
        self.send(ProgressEvent::Info {
            kind: kind.into(),
            info,
        })
        .await;
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new(Arc::new(NullReporter))
    }
}
