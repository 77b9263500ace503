use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Step 사이에서 오가는 값을 표현한다.
///
/// Store에 저장되는 값과 Step 핸들러의 반환값이 모두 이 타입을 사용한다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepValue {
    /// 문자열 값.
    Text(String),
    /// JSON 구조 값.
    Structured(serde_json::Value),
    /// 순서가 있는 값 목록.
    Sequence(Vec<StepValue>),
}

impl StepValue {
    /// 문자열 값이면 슬라이스를 반환한다.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StepValue::Text(text) => Some(text),
            StepValue::Structured(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for StepValue {
    /// 치환에 사용할 문자열 표현을 만든다.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepValue::Text(text) => f.write_str(text),
            StepValue::Structured(serde_json::Value::String(text)) => f.write_str(text),
            StepValue::Structured(value) => write!(f, "{value}"),
            StepValue::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for StepValue {
    fn from(value: String) -> Self {
        StepValue::Text(value)
    }
}

impl From<&str> for StepValue {
    fn from(value: &str) -> Self {
        StepValue::Text(value.to_string())
    }
}

impl From<serde_json::Value> for StepValue {
    fn from(value: serde_json::Value) -> Self {
        StepValue::Structured(value)
    }
}

impl From<Vec<StepValue>> for StepValue {
    fn from(values: Vec<StepValue>) -> Self {
        StepValue::Sequence(values)
    }
}

impl From<i64> for StepValue {
    fn from(value: i64) -> Self {
        StepValue::Structured(value.into())
    }
}

impl From<bool> for StepValue {
    fn from(value: bool) -> Self {
        StepValue::Structured(value.into())
    }
}

/// 실행 중 Step 간 값을 공유하기 위한 저장소이다.
///
/// 한 번의 실행(run) 동안 유지되며 Scenario 사이, 재시도 사이에도 초기화하지 않는다.
#[derive(Debug, Clone, Default)]
pub struct Store {
    /// 키 기반 값 저장소이다.
    vars: HashMap<String, StepValue>,
}

impl Store {
    /// 비어 있는 저장소를 생성한다.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// 값을 설정하고 이전 값을 반환한다.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StepValue>) -> Option<StepValue> {
        self.vars.insert(key.into(), value.into())
    }

    /// 값을 조회한다.
    pub fn get(&self, key: &str) -> Option<&StepValue> {
        self.vars.get(key)
    }

    /// 문자열 값으로 조회한다.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(StepValue::as_text)
    }

    /// 저장소 또는 환경 변수에서 치환용 문자열을 조회한다.
    ///
    /// 우선 저장소에서 찾고 없으면 환경 변수에서 조회한 값을 반환한다.
    pub fn get_or_env(&self, key: &str) -> Option<String> {
        if let Some(value) = self.get(key) {
            return Some(value.to_string());
        }
        std::env::var(key).ok()
    }

    /// 값을 제거한다.
    pub fn remove(&mut self, key: &str) -> Option<StepValue> {
        self.vars.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// 모든 값을 비운다.
    pub fn clear(&mut self) {
        self.vars.clear();
    }
}
