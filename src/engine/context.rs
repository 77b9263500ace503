use super::events::ProgressEvent;
use super::reporter::ProgressSink;
use super::store::Store;

/// Step 핸들러에 전달되는 실행 컨텍스트이다.
///
/// `session`은 실행마다 한 번 만들어 모든 Step이 공유하는 상태(전송 클라이언트,
/// 헤더, 인증 토큰 등)를 담는다. 엔진은 Step을 순차 실행하므로 잠금이 필요 없다.
pub struct RunnerContext<S> {
    /// 실행 전체에서 공유하는 값 저장소.
    pub store: Store,
    /// 호출자가 정의한 세션 상태.
    pub session: S,
    /// 리포터로 진행 이벤트를 보내는 송신기.
    pub progress: ProgressSink,
}

impl<S> RunnerContext<S> {
    /// 빈 Store로 컨텍스트를 생성한다.
    pub fn new(session: S) -> Self {
        Self::with_store(session, Store::new())
    }

    /// 미리 채운 Store로 컨텍스트를 생성한다.
    pub fn with_store(session: S, store: Store) -> Self {
        Self {
            store,
            session,
            progress: ProgressSink::default(),
        }
    }

    /// 진행 이벤트를 리포터에 전달한다.
    pub async fn progress(&self, event: ProgressEvent) {
        self.progress.send(event).await;
    }
}

impl<S: Default> Default for RunnerContext<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
