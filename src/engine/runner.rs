use super::config::RunnerConfig;
use super::context::RunnerContext;
use super::error::{RunError, StepError};
use super::events::ProgressEvent;
use super::interpolate::Interpolator;
use super::registry::StepRegistry;
use super::reporter::{NullReporter, ProgressSink, Reporter};
use super::result::{FeatureResult, RunResult, ScenarioResult, StepResult};
use super::state::UnitStatus;
use crate::feature::{Feature, InterpolatedStep, RunLoadError, Scenario, Step, load_features};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Feature → Scenario → Step 순서로 정의를 실행하는 엔진이다.
///
/// 모든 Step은 하나씩 순차 실행되며, 리포터 호출도 완료를 기다린 뒤 다음 단위로 넘어간다.
pub struct FeatureRunner<S> {
    registry: StepRegistry<S>,
    reporter: Arc<dyn Reporter>,
    config: RunnerConfig,
    cancel: CancellationToken,
}

/// Scenario 한 번의 시도 결과.
struct Attempt {
    step_results: Vec<StepResult>,
    success: bool,
    interrupted: bool,
}

impl<S: Send + 'static> FeatureRunner<S> {
    pub fn new(registry: StepRegistry<S>) -> Self {
        Self {
            registry,
            reporter: Arc::new(NullReporter),
            config: RunnerConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// 진행 이벤트와 최종 결과를 받을 리포터를 지정한다.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Step 사이마다 확인할 중단 토큰을 지정한다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn registry(&self) -> &StepRegistry<S> {
        &self.registry
    }

    /// 로드된 Feature 목록을 실행한다.
    ///
    /// Step 실패는 결과 트리에만 기록되며 이 함수는 항상 [`RunResult`]를 반환한다.
    pub async fn run(&self, features: &[Feature], ctx: &mut RunnerContext<S>) -> RunResult {
        ctx.progress = ProgressSink::new(self.reporter.clone());
        let started = Instant::now();
        let mut cut_short = false;
        let mut feature_results = Vec::with_capacity(features.len());
        for feature in features {
            feature_results.push(self.run_feature(feature, ctx, &mut cut_short).await);
        }
        // 모든 단위가 끝난 뒤의 중단 요청은 결과에 영향을 주지 않는다.
        let error = cut_short.then_some(RunError::Cancelled);
        let result = RunResult::new(feature_results, Some(started.elapsed()), error);
        self.reporter.report(&result).await;
        result
    }

    /// 로드 결과를 받아 실행한다. 로드에 실패하면 빈 결과와 함께 오류를 기록한다.
    pub async fn run_loaded(
        &self,
        loaded: Result<Vec<Feature>, RunLoadError>,
        ctx: &mut RunnerContext<S>,
    ) -> RunResult {
        match loaded {
            Ok(features) => self.run(&features, ctx).await,
            Err(err) => {
                tracing::error!(error = %err, "Feature 로드 실패");
                let result = RunResult::load_failed(RunError::Load(err));
                self.reporter.report(&result).await;
                result
            }
        }
    }

    /// glob 패턴에 해당하는 YAML Feature 파일을 읽어 실행한다.
    pub async fn run_glob(&self, pattern: &str, ctx: &mut RunnerContext<S>) -> RunResult {
        self.run_loaded(load_features(pattern), ctx).await
    }

    async fn emit(&self, event: ProgressEvent) {
        self.reporter.progress(&event).await;
    }

    /// 중단 요청을 확인하고, 요청이 있으면 실행이 잘렸음을 기록한다.
    fn interrupted(&self, cut_short: &mut bool) -> bool {
        let cancelled = self.cancel.is_cancelled();
        *cut_short |= cancelled;
        cancelled
    }

    async fn run_feature(
        &self,
        feature: &Feature,
        ctx: &mut RunnerContext<S>,
        cut_short: &mut bool,
    ) -> FeatureResult {
        if feature.skip || self.interrupted(cut_short) {
            tracing::debug!(feature = %feature.name, "Feature 건너뜀");
            return FeatureResult::skipped(feature);
        }
        tracing::info!(feature = %feature.name, scenarios = feature.scenarios.len(), "Feature 시작");
        self.emit(ProgressEvent::Feature {
            name: feature.name.clone(),
        })
        .await;
        let started = Instant::now();
        let mut scenario_results = Vec::with_capacity(feature.scenarios.len());
        for scenario in &feature.scenarios {
            scenario_results.push(self.run_scenario(scenario, ctx, cut_short).await);
        }
        FeatureResult::from_scenarios(feature, scenario_results, started.elapsed())
    }

    /// Scenario 전체를 최대 `max_tries`번 시도한다. Store는 시도 사이에 유지된다.
    async fn run_scenario(
        &self,
        scenario: &Scenario,
        ctx: &mut RunnerContext<S>,
        cut_short: &mut bool,
    ) -> ScenarioResult {
        if scenario.skip || self.interrupted(cut_short) {
            return ScenarioResult::skipped(scenario);
        }
        let name = scenario.display_name();
        let max_tries = scenario.max_tries.max(1);
        tracing::info!(scenario = name, max_tries, "Scenario 시작");
        self.emit(ProgressEvent::Scenario {
            name: name.to_string(),
        })
        .await;
        let started = Instant::now();
        let mut attempt: u32 = 1;
        loop {
            let outcome = self.run_attempt(scenario, ctx, cut_short).await;
            if outcome.success || outcome.interrupted || attempt >= max_tries {
                if !outcome.success {
                    tracing::warn!(scenario = name, tries = attempt, "Scenario 실패");
                }
                return ScenarioResult {
                    scenario: scenario.clone(),
                    step_results: outcome.step_results,
                    success: outcome.success,
                    skipped: false,
                    tries: attempt,
                    run_time: Some(started.elapsed()),
                };
            }
            attempt += 1;
            tracing::warn!(scenario = name, attempt, max_tries, "Scenario 재시도");
            self.emit(ProgressEvent::Retry {
                scenario: name.to_string(),
                attempt,
                max_tries,
            })
            .await;
            let delay = self.config.retry_delay();
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }

    /// Step을 순서대로 실행하고 첫 실패 이후의 Step은 건너뛴다.
    async fn run_attempt(
        &self,
        scenario: &Scenario,
        ctx: &mut RunnerContext<S>,
        cut_short: &mut bool,
    ) -> Attempt {
        let mut step_results = Vec::with_capacity(scenario.steps.len());
        let mut failed = false;
        let mut interrupted = false;
        for step in &scenario.steps {
            if !failed && !interrupted && self.interrupted(cut_short) {
                tracing::warn!(scenario = scenario.display_name(), "실행 중단 요청으로 남은 Step을 건너뜀");
                interrupted = true;
            }
            if failed || interrupted {
                step_results.push(StepResult::skipped(step));
                continue;
            }
            let result = self.run_step(step, ctx).await;
            failed = !result.success;
            step_results.push(result);
        }
        Attempt {
            step_results,
            success: !failed && !interrupted,
            interrupted,
        }
    }

    /// 치환 → 실행기 탐색 → 핸들러 호출 순으로 Step 하나를 실행한다.
    async fn run_step(&self, step: &Step, ctx: &mut RunnerContext<S>) -> StepResult {
        let interpolator = Interpolator::new(self.config.env_fallback);
        let interpolated = match step.interpolate(&interpolator, &ctx.store) {
            Ok(interpolated) => interpolated,
            Err(err) => {
                // 치환 전 문장으로 시작 이벤트를 보내 시작/종료 쌍을 맞춘다.
                self.emit(ProgressEvent::Step {
                    text: step.text.clone(),
                })
                .await;
                return self.step_failed(step.verbatim(), err.into(), None).await;
            }
        };
        tracing::debug!(
            step = %interpolated.interpolated_text,
            status = %UnitStatus::Running,
            "Step 시작"
        );
        self.emit(ProgressEvent::Step {
            text: interpolated.interpolated_text.clone(),
        })
        .await;
        let (runner, groups) = match self.registry.find_runner(&interpolated) {
            Ok(found) => found,
            Err(err) => return self.step_failed(interpolated, err, None).await,
        };
        let started = Instant::now();
        let outcome = AssertUnwindSafe(runner.run(groups, &interpolated, ctx))
            .catch_unwind()
            .await;
        let run_time = started.elapsed();
        match outcome {
            Ok(Ok(value)) => {
                tracing::debug!(
                    step = %interpolated.interpolated_text,
                    status = %UnitStatus::Succeeded,
                    elapsed_ms = run_time.as_millis() as u64,
                    "Step 종료"
                );
                self.emit(ProgressEvent::StepPassed {
                    text: interpolated.interpolated_text.clone(),
                })
                .await;
                StepResult::passed(interpolated, value, run_time)
            }
            Ok(Err(err)) => self.step_failed(interpolated, err, Some(run_time)).await,
            Err(payload) => {
                let err = StepError::handler(panic_message(payload));
                self.step_failed(interpolated, err, Some(run_time)).await
            }
        }
    }

    async fn step_failed(
        &self,
        step: InterpolatedStep,
        error: StepError,
        run_time: Option<std::time::Duration>,
    ) -> StepResult {
        tracing::warn!(step = %step.interpolated_text, error = %error, "Step 실패");
        self.emit(ProgressEvent::StepFailed {
            text: step.interpolated_text.clone(),
            message: error.to_string(),
        })
        .await;
        StepResult::failed(step, error, run_time)
    }
}

/// panic 페이로드에서 메시지를 꺼낸다.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("Step 핸들러 panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("Step 핸들러 panic: {message}")
    } else {
        "Step 핸들러 panic".to_string()
    }
}
