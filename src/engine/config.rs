use anyhow::Context;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// 실행 엔진 동작 설정이다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Scenario 재시도 전 대기 시간(밀리초). 0이면 바로 재시도한다.
    pub retry_delay_ms: u64,
    /// Store에 없는 플레이스홀더를 환경 변수에서 찾을지 여부.
    pub env_fallback: bool,
}

impl RunnerConfig {
    /// 재시도 대기 시간을 반환한다.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// YAML 파일을 읽어 설정으로 역직렬화한다.
pub fn load_config_from_file(path: &Path) -> anyhow::Result<RunnerConfig> {
    let mut file = File::open(path)
        .with_context(|| format!("설정 파일을 열 수 없습니다: {}", path.display()))?;
    load_config_from_reader(&mut file)
}

/// Reader에서 YAML을 읽어 설정으로 파싱한다.
pub fn load_config_from_reader<R: Read>(reader: &mut R) -> anyhow::Result<RunnerConfig> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Ok(RunnerConfig::default());
    }
    let config: RunnerConfig = serde_yaml::from_str(&buf).context("설정 파싱 실패")?;
    Ok(config)
}
