use super::context::RunnerContext;
use super::error::{RegistryError, StepError};
use super::store::StepValue;
use crate::feature::InterpolatedStep;
use async_trait::async_trait;
use futures::future::BoxFuture;
use regex::Regex;
use std::sync::Arc;

/// Step 핸들러의 반환 타입이다.
pub type StepOutcome = Result<Option<StepValue>, StepError>;

/// Step 문장 매칭으로 얻은 캡처 그룹이다.
///
/// 인덱스 0이 첫 번째 캡처 그룹이며, 매칭되지 않은 선택 그룹은 `None`이다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGroups(Vec<Option<String>>);

impl MatchGroups {
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self(groups)
    }

    /// 캡처 값을 조회한다.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|group| group.as_deref())
    }

    /// 반드시 있어야 하는 캡처 값을 조회한다.
    pub fn required(&self, index: usize) -> Result<&str, StepError> {
        self.get(index)
            .ok_or_else(|| StepError::handler(format!("캡처 그룹 {index}을 찾을 수 없습니다.")))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Step 문장을 인식하고 실행하는 매처+핸들러 쌍이다.
#[async_trait]
pub trait StepRunner<S>: Send + Sync {
    /// 문장을 처리할 수 있으면 캡처 그룹을 반환한다.
    fn matches(&self, text: &str) -> Option<MatchGroups>;

    /// 문장을 처리할 수 있는지 확인한다.
    fn will_run(&self, text: &str) -> bool {
        self.matches(text).is_some()
    }

    /// Step을 실행한다.
    async fn run(
        &self,
        groups: MatchGroups,
        step: &InterpolatedStep,
        ctx: &mut RunnerContext<S>,
    ) -> StepOutcome;
}

/// 정규식 매처에 연결되는 비동기 핸들러 타입이다.
pub type StepHandler<S> = dyn for<'a> Fn(MatchGroups, &'a InterpolatedStep, &'a mut RunnerContext<S>) -> BoxFuture<'a, StepOutcome>
    + Send
    + Sync;

/// 정규식으로 문장을 매칭하는 StepRunner이다.
pub struct RegexStepRunner<S> {
    pattern: Regex,
    handler: Arc<StepHandler<S>>,
}

impl<S> RegexStepRunner<S> {
    /// 패턴을 컴파일하고 핸들러를 연결한다.
    pub fn new<F>(pattern: &str, handler: F) -> Result<Self, RegistryError>
    where
        F: for<'a> Fn(
                MatchGroups,
                &'a InterpolatedStep,
                &'a mut RunnerContext<S>,
            ) -> BoxFuture<'a, StepOutcome>
            + Send
            + Sync
            + 'static,
    {
        let pattern = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            handler: Arc::new(handler),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

#[async_trait]
impl<S: Send + 'static> StepRunner<S> for RegexStepRunner<S> {
    fn matches(&self, text: &str) -> Option<MatchGroups> {
        let captures = self.pattern.captures(text)?;
        let groups = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        Some(MatchGroups::new(groups))
    }

    async fn run(
        &self,
        groups: MatchGroups,
        step: &InterpolatedStep,
        ctx: &mut RunnerContext<S>,
    ) -> StepOutcome {
        (self.handler)(groups, step, ctx).await
    }
}

/// 등록 순서를 보존하는 StepRunner 목록이다.
///
/// 여러 Step 묶음의 패턴이 겹칠 수 있으므로 먼저 등록한 실행기가 우선한다.
pub struct StepRegistry<S> {
    runners: Vec<Arc<dyn StepRunner<S>>>,
}

impl<S: Send + 'static> StepRegistry<S> {
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
        }
    }

    /// 실행기를 맨 뒤에 등록한다.
    pub fn register(&mut self, runner: Arc<dyn StepRunner<S>>) -> &mut Self {
        self.runners.push(runner);
        self
    }

    /// 정규식 패턴과 핸들러로 실행기를 등록한다.
    pub fn step<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, RegistryError>
    where
        F: for<'a> Fn(
                MatchGroups,
                &'a InterpolatedStep,
                &'a mut RunnerContext<S>,
            ) -> BoxFuture<'a, StepOutcome>
            + Send
            + Sync
            + 'static,
    {
        let runner = RegexStepRunner::new(pattern, handler)?;
        Ok(self.register(Arc::new(runner)))
    }

    /// Step 묶음 전체를 순서대로 등록한다.
    pub fn extend<I>(&mut self, pack: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn StepRunner<S>>>,
    {
        self.runners.extend(pack);
        self
    }

    /// 치환된 문장에 대해 `will_run`이 참인 첫 번째 실행기를 찾는다.
    ///
    /// 캡처 그룹은 선택된 실행기의 `matches`에서 얻으며, 그룹이 없으면 비어 있다.
    pub fn find_runner(
        &self,
        step: &InterpolatedStep,
    ) -> Result<(Arc<dyn StepRunner<S>>, MatchGroups), StepError> {
        let text = step.interpolated_text.as_str();
        self.runners
            .iter()
            .find(|runner| runner.will_run(text))
            .map(|runner| (runner.clone(), runner.matches(text).unwrap_or_default()))
            .ok_or_else(|| StepError::RunnerNotDefined { step: step.clone() })
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

impl<S: Send + 'static> Default for StepRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
