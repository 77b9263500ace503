use super::error::{RunError, StepError};
use super::state::UnitStatus;
use super::store::StepValue;
use crate::feature::{Feature, InterpolatedStep, Scenario, Step};
use std::time::Duration;

/// Step 하나의 실행 결과이다.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// 실행 시점에 치환된 Step.
    pub step: InterpolatedStep,
    pub success: bool,
    pub skipped: bool,
    pub error: Option<StepError>,
    /// 핸들러가 반환한 값.
    pub result: Option<StepValue>,
    /// 핸들러 실행 시간.
    pub run_time: Option<Duration>,
}

impl StepResult {
    /// 실행하지 않은 Step 결과를 만든다.
    pub fn skipped(step: &Step) -> Self {
        Self {
            step: step.verbatim(),
            success: false,
            skipped: true,
            error: None,
            result: None,
            run_time: None,
        }
    }

    pub(crate) fn passed(
        step: InterpolatedStep,
        result: Option<StepValue>,
        run_time: Duration,
    ) -> Self {
        Self {
            step,
            success: true,
            skipped: false,
            error: None,
            result,
            run_time: Some(run_time),
        }
    }

    pub(crate) fn failed(
        step: InterpolatedStep,
        error: StepError,
        run_time: Option<Duration>,
    ) -> Self {
        Self {
            step,
            success: false,
            skipped: false,
            error: Some(error),
            result: None,
            run_time,
        }
    }

    pub fn status(&self) -> UnitStatus {
        UnitStatus::settled(self.success, self.skipped)
    }
}

/// Scenario의 마지막 시도 결과이다.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// 마지막 시도의 Step 결과(선언 순서).
    pub step_results: Vec<StepResult>,
    pub success: bool,
    pub skipped: bool,
    /// 수행한 시도 횟수(1 이상).
    pub tries: u32,
    /// 모든 시도를 합한 실행 시간.
    pub run_time: Option<Duration>,
}

impl ScenarioResult {
    /// 실행하지 않은 Scenario 결과를 만든다. 하위 Step도 모두 건너뜀으로 기록한다.
    pub fn skipped(scenario: &Scenario) -> Self {
        Self {
            scenario: scenario.clone(),
            step_results: scenario.steps.iter().map(StepResult::skipped).collect(),
            success: true,
            skipped: true,
            tries: 1,
            run_time: None,
        }
    }

    pub fn status(&self) -> UnitStatus {
        UnitStatus::settled(self.success, self.skipped)
    }
}

/// Feature 실행 결과이다.
#[derive(Debug, Clone)]
pub struct FeatureResult {
    pub feature: Feature,
    pub scenario_results: Vec<ScenarioResult>,
    /// 건너뛰지 않은 모든 Scenario가 성공했는지 여부.
    pub success: bool,
    /// `skip` 표시나 실행 중단으로 Feature를 실행하지 않았는지 여부.
    pub skipped: bool,
    pub run_time: Option<Duration>,
}

impl FeatureResult {
    /// 실행하지 않은 Feature 결과를 만든다.
    pub fn skipped(feature: &Feature) -> Self {
        Self {
            feature: feature.clone(),
            scenario_results: feature
                .scenarios
                .iter()
                .map(ScenarioResult::skipped)
                .collect(),
            success: true,
            skipped: true,
            run_time: None,
        }
    }

    pub(crate) fn from_scenarios(
        feature: &Feature,
        scenario_results: Vec<ScenarioResult>,
        run_time: Duration,
    ) -> Self {
        let success = scenario_results
            .iter()
            .filter(|result| !result.skipped)
            .all(|result| result.success);
        Self {
            feature: feature.clone(),
            scenario_results,
            success,
            skipped: false,
            run_time: Some(run_time),
        }
    }

    pub fn status(&self) -> UnitStatus {
        UnitStatus::settled(self.success, self.skipped)
    }
}

/// 실행 전체 결과이다.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub feature_results: Vec<FeatureResult>,
    pub success: bool,
    pub run_time: Option<Duration>,
    /// 로드 실패나 중단처럼 실행 전체에 영향을 준 오류.
    pub error: Option<RunError>,
}

impl RunResult {
    pub(crate) fn new(
        feature_results: Vec<FeatureResult>,
        run_time: Option<Duration>,
        error: Option<RunError>,
    ) -> Self {
        let success = error.is_none() && feature_results.iter().all(|result| result.success);
        Self {
            feature_results,
            success,
            run_time,
            error,
        }
    }

    /// 로드 단계에서 실패한 실행 결과를 만든다.
    pub fn load_failed(error: RunError) -> Self {
        Self::new(Vec::new(), None, Some(error))
    }

    /// Feature/Scenario 집계를 계산한다.
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for feature_result in &self.feature_results {
            let feature_skipped = feature_result.skipped;
            summary.features.count(feature_skipped, feature_result.success);
            for scenario_result in &feature_result.scenario_results {
                summary.scenarios.count(
                    feature_skipped || scenario_result.skipped,
                    scenario_result.success,
                );
            }
        }
        summary
    }
}

/// 통과/실패/건너뜀 개수 집계이다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

impl Tally {
    fn count(&mut self, skipped: bool, success: bool) {
        self.total += 1;
        if skipped {
            self.skipped += 1;
        } else if success {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// 실행 결과 요약이다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub features: Tally,
    pub scenarios: Tally,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scenario_result(name: &str, success: bool, skipped: bool) -> ScenarioResult {
        ScenarioResult {
            scenario: Scenario::new(name, vec![Step::new("a step")]),
            step_results: Vec::new(),
            success,
            skipped,
            tries: 1,
            run_time: Some(Duration::from_millis(1)),
        }
    }

    #[test]
    fn feature_success_ignores_skipped_scenarios() {
        let feature = Feature::new("f", Vec::new());
        let result = FeatureResult::from_scenarios(
            &feature,
            vec![
                scenario_result("ok", true, false),
                scenario_result("skipped", false, true),
            ],
            Duration::ZERO,
        );
        assert!(result.success);
        assert_eq!(result.status(), UnitStatus::Succeeded);
    }

    #[test]
    fn skipped_feature_marks_every_descendant() {
        let feature = Feature::new(
            "f",
            vec![Scenario::new("s", vec![Step::new("one"), Step::new("two")])],
        )
        .skipped(true);
        let result = FeatureResult::skipped(&feature);
        assert!(result.success);
        assert_eq!(result.status(), UnitStatus::Skipped);
        let scenario = &result.scenario_results[0];
        assert!(scenario.skipped);
        assert!(scenario.step_results.iter().all(|step| step.skipped));
    }

    #[test]
    fn skip_status_comes_from_flag_not_timing() {
        let feature = Feature::new("f", vec![Scenario::new("s", vec![Step::new("one")])]);
        let interrupted = FeatureResult::skipped(&feature);
        assert!(!interrupted.feature.skip);
        assert!(interrupted.skipped);
        assert_eq!(interrupted.status(), UnitStatus::Skipped);

        let mut ran =
            FeatureResult::from_scenarios(&feature, vec![scenario_result("s", true, false)], Duration::ZERO);
        ran.run_time = None;
        assert!(!ran.skipped);
        assert_eq!(ran.status(), UnitStatus::Succeeded);
    }

    #[test]
    fn run_error_forces_failure() {
        let result = RunResult::new(Vec::new(), None, Some(RunError::Cancelled));
        assert!(!result.success);
        assert!(RunResult::new(Vec::new(), None, None).success);
    }

    #[test]
    fn summary_counts_features_and_scenarios() {
        let passing = FeatureResult::from_scenarios(
            &Feature::new("pass", Vec::new()),
            vec![scenario_result("a", true, false)],
            Duration::ZERO,
        );
        let failing = FeatureResult::from_scenarios(
            &Feature::new("fail", Vec::new()),
            vec![
                scenario_result("b", true, false),
                scenario_result("c", false, false),
            ],
            Duration::ZERO,
        );
        let skipped = FeatureResult::skipped(
            &Feature::new("skip", vec![Scenario::new("d", Vec::new())]).skipped(true),
        );
        let run = RunResult::new(vec![passing, failing, skipped], None, None);
        assert!(!run.success);
        assert_eq!(
            run.summary(),
            RunSummary {
                features: Tally {
                    passed: 1,
                    failed: 1,
                    skipped: 1,
                    total: 3
                },
                scenarios: Tally {
                    passed: 2,
                    failed: 1,
                    skipped: 1,
                    total: 4
                },
            }
        );
    }
}
