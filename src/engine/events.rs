use super::result::RunResult;
use std::fmt;

/// 엔진이 리포터에 전달하는 진행 이벤트이다.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Feature 시작 알림.
    Feature { name: String },
    /// Scenario 시작 알림.
    Scenario { name: String },
    /// Step 시작 알림(치환된 문장).
    Step { text: String },
    /// Step 성공 종료.
    StepPassed { text: String },
    /// Step 실패 종료.
    StepFailed { text: String, message: String },
    /// Scenario 재시도 알림. `attempt`는 새로 시작하는 시도 번호이다.
    Retry {
        scenario: String,
        attempt: u32,
        max_tries: u32,
    },
    /// Step 핸들러가 직접 보내는 임의 이벤트.
    Info { kind: String, info: Option<String> },
}

impl ProgressEvent {
    /// 이벤트 종류 문자열.
    pub fn kind(&self) -> &str {
        match self {
            ProgressEvent::Feature { .. } => "feature",
            ProgressEvent::Scenario { .. } => "scenario",
            ProgressEvent::Step { .. } => "step",
            ProgressEvent::StepPassed { .. } => "step done",
            ProgressEvent::StepFailed { .. } => "step error",
            ProgressEvent::Retry { .. } => "retry",
            ProgressEvent::Info { kind, .. } => kind,
        }
    }

    /// 이벤트 부가 정보.
    pub fn info(&self) -> Option<String> {
        match self {
            ProgressEvent::Feature { name } | ProgressEvent::Scenario { name } => {
                Some(name.clone())
            }
            ProgressEvent::Step { text } | ProgressEvent::StepPassed { text } => Some(text.clone()),
            ProgressEvent::StepFailed { text, message } => Some(format!("{text}: {message}")),
            ProgressEvent::Retry {
                scenario,
                attempt,
                max_tries,
            } => Some(format!("{scenario} ({attempt}/{max_tries})")),
            ProgressEvent::Info { info, .. } => info.clone(),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.info() {
            Some(info) => write!(f, "{} {info}", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}

/// 채널로 외부(UI, CI 리포터 등)에 전달되는 엔진 이벤트이다.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// 진행 이벤트.
    Progress(ProgressEvent),
    /// 전체 실행 종료.
    RunFinished(RunResult),
}
