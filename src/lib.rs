//! Feature → Scenario → Step 정의를 등록된 Step 실행기에 매칭해 순차 실행하는 엔진.
//!
//! Step 사이의 값 공유(Store), `{{key}}` 치환, Scenario 단위 재시도,
//! 결과 트리 집계와 리포터 연동을 제공한다.

pub mod engine;
pub mod feature;
pub mod logging;

pub use engine::{
    FeatureRunner, Reporter, RunResult, RunnerConfig, RunnerContext, StepError, StepRegistry,
    StepValue, Store,
};
pub use feature::{Feature, InterpolatedStep, RunLoadError, Scenario, ScenarioKind, Step, Tag};
