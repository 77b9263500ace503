use super::interpolate::InterpolationError;
use super::store::StepValue;
use crate::feature::{InterpolatedStep, RunLoadError};
use std::fmt;
use thiserror::Error;

/// Step 핸들러의 검증 실패를 표현한다.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    /// 실패 메시지.
    pub message: String,
    /// 기대값.
    pub expected: Option<StepValue>,
    /// 실제값.
    pub actual: Option<StepValue>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (기대값: {expected}, 실제값: {actual})")?;
        }
        Ok(())
    }
}

/// Step 실행 실패 사유이다. 모두 StepResult에 기록되며 엔진 밖으로 전파되지 않는다.
#[derive(Debug, Clone, Error)]
pub enum StepError {
    /// 어떤 StepRunner도 Step 문장과 매칭되지 않았다.
    #[error("Step 실행기가 정의되지 않았습니다: {}", .step.interpolated_text)]
    RunnerNotDefined { step: InterpolatedStep },
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
    #[error("검증 실패: {0}")]
    Assertion(AssertionFailure),
    /// 그 외 핸들러 오류(전송 실패, 잘못된 입력, panic 등).
    #[error("{message}")]
    Handler { message: String },
}

impl StepError {
    /// 기대값/실제값을 포함한 검증 실패를 만든다.
    pub fn assertion(
        message: impl Into<String>,
        expected: impl Into<StepValue>,
        actual: impl Into<StepValue>,
    ) -> Self {
        StepError::Assertion(AssertionFailure {
            message: message.into(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        })
    }

    /// 기대값 없이 조건만 실패한 검증 오류를 만든다.
    pub fn failed_check(message: impl Into<String>) -> Self {
        StepError::Assertion(AssertionFailure {
            message: message.into(),
            expected: None,
            actual: None,
        })
    }

    /// 임의의 오류를 핸들러 오류로 감싼다.
    pub fn handler(err: impl fmt::Display) -> Self {
        StepError::Handler {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for StepError {
    fn from(err: anyhow::Error) -> Self {
        StepError::Handler {
            message: format!("{err:#}"),
        }
    }
}

/// 두 값이 같은지 검증한다.
pub fn assert_value_eq(
    expected: impl Into<StepValue>,
    actual: impl Into<StepValue>,
) -> Result<(), StepError> {
    let expected = expected.into();
    let actual = actual.into();
    if expected == actual {
        Ok(())
    } else {
        Err(StepError::assertion("값이 일치하지 않습니다", expected, actual))
    }
}

/// 실행(run) 전체를 실패로 만드는 오류이다.
#[derive(Debug, Clone, Error)]
pub enum RunError {
    #[error("Feature 로드 실패: {0}")]
    Load(#[from] RunLoadError),
    #[error("사용자에 의해 실행이 중단되었습니다.")]
    Cancelled,
}

/// Step 패턴 등록 오류이다.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Step 패턴 컴파일 실패: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn assert_value_eq_carries_both_sides() {
        assert!(assert_value_eq("a", "a").is_ok());
        match assert_value_eq(200, 404) {
            Err(StepError::Assertion(failure)) => {
                assert_eq!(failure.expected, Some(StepValue::from(200)));
                assert_eq!(failure.actual, Some(StepValue::from(404)));
                assert!(failure.to_string().contains("404"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn anyhow_chain_is_kept_in_handler_message() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = err.context("GET /items").unwrap_err();
        let step_err = StepError::from(err);
        assert_eq!(step_err.to_string(), "GET /items: connection refused");
    }
}
