use crate::engine::{InterpolationError, Interpolator, Store};
use glob::glob;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Feature 선택/필터링에 사용하는 태그이다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tag {
    /// 태그 이름.
    pub name: String,
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self { name }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.name
    }
}

/// Scenario의 정의 형태를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// 일반 Scenario.
    #[default]
    Scenario,
    /// Examples 표로 전개된 Scenario Outline.
    Outline,
}

impl ScenarioKind {
    /// 리포터 표시용 이름을 반환한다.
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Scenario => "Scenario",
            ScenarioKind::Outline => "Scenario Outline",
        }
    }
}

/// Step은 Scenario 내 최소 실행 단위를 표현한다.
///
/// 원본 `text`/`argument`는 변경하지 않으며, 치환 결과는 매 시도마다
/// [`InterpolatedStep`]으로 새로 만든다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Step 문장.
    pub text: String,
    /// DocString 등 Step에 딸린 인자.
    pub argument: Option<String>,
}

impl Step {
    /// 인자 없는 Step을 생성한다.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            argument: None,
        }
    }

    /// 인자를 가진 Step을 생성한다.
    pub fn with_argument(text: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            argument: Some(argument.into()),
        }
    }

    /// 현재 Store 상태로 문장과 인자를 각각 치환한다.
    pub fn interpolate(
        &self,
        interpolator: &Interpolator,
        store: &Store,
    ) -> Result<InterpolatedStep, InterpolationError> {
        let interpolated_text = interpolator.interpolate(&self.text, store)?;
        let interpolated_argument = match &self.argument {
            Some(argument) => Some(interpolator.interpolate(argument, store)?),
            None => None,
        };
        Ok(InterpolatedStep {
            step: self.clone(),
            interpolated_text,
            interpolated_argument,
        })
    }

    /// 치환 없이 원문을 그대로 사용하는 형태로 변환한다.
    pub fn verbatim(&self) -> InterpolatedStep {
        InterpolatedStep {
            step: self.clone(),
            interpolated_text: self.text.clone(),
            interpolated_argument: self.argument.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for Step {
    /// 문자열 한 줄 또는 `text`/`argument` 구조체 형태를 모두 지원한다.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Simple(String),
            Detailed {
                text: String,
                #[serde(default)]
                argument: Option<String>,
            },
        }

        let step = match Helper::deserialize(deserializer)? {
            Helper::Simple(text) => Step::new(text),
            Helper::Detailed { text, argument } => Step { text, argument },
        };
        if step.text.trim().is_empty() {
            return Err(de::Error::custom("Step 문장이 비어 있습니다."));
        }
        Ok(step)
    }
}

/// 한 번의 실행 시도에서 치환이 끝난 Step이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolatedStep {
    /// 원본 Step 정의.
    pub step: Step,
    /// 치환된 Step 문장.
    pub interpolated_text: String,
    /// 치환된 인자.
    pub interpolated_argument: Option<String>,
}

impl InterpolatedStep {
    /// 원본 Step 문장.
    pub fn text(&self) -> &str {
        &self.step.text
    }

    /// 원본 인자.
    pub fn argument(&self) -> Option<&str> {
        self.step.argument.as_deref()
    }
}

/// Scenario는 재시도 단위가 되는 Step 묶음이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario 종류.
    #[serde(default, rename = "type")]
    pub kind: ScenarioKind,
    /// Scenario 이름.
    #[serde(default)]
    pub name: Option<String>,
    /// 태그 집합.
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    /// 실행 없이 건너뛸지 여부.
    #[serde(default)]
    pub skip: bool,
    /// 최대 시도 횟수(1 이상).
    #[serde(default = "default_max_tries", deserialize_with = "at_least_one")]
    pub max_tries: u32,
    /// Step 목록.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// 기본 설정의 Scenario를 생성한다.
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            kind: ScenarioKind::Scenario,
            name: Some(name.into()),
            tags: BTreeSet::new(),
            skip: false,
            max_tries: 1,
            steps,
        }
    }

    /// 최대 시도 횟수를 지정한다. 0은 1로 보정한다.
    pub fn with_max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries.max(1);
        self
    }

    /// 건너뛰기 여부를 지정한다.
    pub fn skipped(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// 로그와 진행 이벤트에 사용할 표시 이름.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// Feature는 Scenario를 묶는 최상위 정의이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature 이름.
    pub name: String,
    /// 태그 집합.
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    /// 하위 전체를 건너뛸지 여부.
    #[serde(default)]
    pub skip: bool,
    /// Scenario 목록.
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    /// Feature를 생성한다.
    pub fn new(name: impl Into<String>, scenarios: Vec<Scenario>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
            skip: false,
            scenarios,
        }
    }

    /// 건너뛰기 여부를 지정한다.
    pub fn skipped(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// 태그를 추가한다.
    pub fn tagged(mut self, tag: impl Into<Tag>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// 태그 보유 여부를 확인한다.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

fn default_max_tries() -> u32 {
    1
}

fn at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(u32::deserialize(deserializer)?.max(1))
}

/// Feature 정의를 읽어들이는 과정의 오류이다.
#[derive(Debug, Clone, Error)]
pub enum RunLoadError {
    #[error("Feature 파일을 읽을 수 없습니다: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
    #[error("Feature 정의 파싱 실패: {origin}")]
    Parse {
        origin: String,
        #[source]
        source: Arc<serde_yaml::Error>,
    },
    #[error("glob 패턴 파싱 실패: {0}")]
    Pattern(Arc<glob::PatternError>),
    #[error("Feature 경로 탐색 실패: {0}")]
    Glob(Arc<glob::GlobError>),
}

impl From<glob::PatternError> for RunLoadError {
    fn from(err: glob::PatternError) -> Self {
        RunLoadError::Pattern(Arc::new(err))
    }
}

impl From<glob::GlobError> for RunLoadError {
    fn from(err: glob::GlobError) -> Self {
        RunLoadError::Glob(Arc::new(err))
    }
}

/// YAML 파일 하나를 읽어 Feature로 역직렬화한다.
pub fn load_feature_from_file(path: &Path) -> Result<Feature, RunLoadError> {
    let mut file = File::open(path).map_err(|err| RunLoadError::Read {
        path: path.to_path_buf(),
        source: Arc::new(err),
    })?;
    load_feature_from_reader(&mut file, &path.display().to_string())
}

/// Reader에서 YAML을 읽어 Feature 구조체로 파싱한다.
///
/// `origin`은 오류 메시지에 표시할 출처 이름이다.
pub fn load_feature_from_reader<R: Read>(
    reader: &mut R,
    origin: &str,
) -> Result<Feature, RunLoadError> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| RunLoadError::Read {
            path: PathBuf::from(origin),
            source: Arc::new(err),
        })?;
    serde_yaml::from_str(&buf).map_err(|err| RunLoadError::Parse {
        origin: origin.to_string(),
        source: Arc::new(err),
    })
}

/// glob 패턴에 해당하는 모든 Feature 파일을 경로 순으로 읽는다.
pub fn load_features(pattern: &str) -> Result<Vec<Feature>, RunLoadError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in glob(pattern)? {
        paths.push(entry?);
    }
    paths.sort();
    paths
        .iter()
        .filter(|path| path.is_file())
        .map(|path| load_feature_from_file(path))
        .collect()
}
