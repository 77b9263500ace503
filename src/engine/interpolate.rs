use super::store::Store;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("정규식 컴파일 실패"));

/// 플레이스홀더 치환 실패를 표현한다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("Store에 '{key}' 값이 없어 치환할 수 없습니다: {text}")]
    MissingKey { key: String, text: String },
}

/// `{{key}}` 플레이스홀더를 Store 값으로 치환한다.
///
/// 캐시 없이 호출할 때마다 현재 Store 상태를 다시 읽는다.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator {
    /// Store에 없는 키를 환경 변수에서 찾을지 여부.
    pub env_fallback: bool,
}

impl Interpolator {
    pub fn new(env_fallback: bool) -> Self {
        Self { env_fallback }
    }

    /// `text` 안의 플레이스홀더를 모두 치환한다.
    ///
    /// # 반환값
    /// 플레이스홀더가 없으면 원문을 그대로 반환하고, 참조한 키가 없으면
    /// 처음 발견한 키로 [`InterpolationError::MissingKey`]를 반환한다.
    pub fn interpolate(&self, text: &str, store: &Store) -> Result<String, InterpolationError> {
        let mut missing: Option<String> = None;
        let result = PLACEHOLDER.replace_all(text, |caps: &regex::Captures| {
            let key = &caps[1];
            let value = if self.env_fallback {
                store.get_or_env(key)
            } else {
                store.get(key).map(|value| value.to_string())
            };
            match value {
                Some(value) => value,
                None => {
                    missing.get_or_insert_with(|| key.to_string());
                    caps[0].to_string()
                }
            }
        });
        match missing {
            Some(key) => Err(InterpolationError::MissingKey {
                key,
                text: text.to_string(),
            }),
            None => Ok(result.into_owned()),
        }
    }
}

/// 기본 설정(환경 변수 미사용)으로 치환한다.
pub fn interpolate(text: &str, store: &Store) -> Result<String, InterpolationError> {
    Interpolator::default().interpolate(text, store)
}
