use std::fmt;

/// 실행 단위(Feature/Scenario/Step)의 상태를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// 아직 실행 대기 상태.
    Pending,
    /// 실행 중.
    Running,
    /// 정상 종료.
    Succeeded,
    /// 실패.
    Failed,
    /// 실행하지 않고 건너뜀.
    Skipped,
}

impl UnitStatus {
    /// 결과 플래그로부터 최종 상태를 계산한다.
    pub fn settled(success: bool, skipped: bool) -> Self {
        match (skipped, success) {
            (true, _) => UnitStatus::Skipped,
            (false, true) => UnitStatus::Succeeded,
            (false, false) => UnitStatus::Failed,
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnitStatus::Pending => "pending",
            UnitStatus::Running => "running",
            UnitStatus::Succeeded => "passed",
            UnitStatus::Failed => "failed",
            UnitStatus::Skipped => "skipped",
        };
        f.write_str(label)
    }
}
