//! UseCase: セッション状態の通知
//!
//! 参加者ごとに個人チャンネルへ `session_status_update` を送る。
//! 参加者リストの重複は取り除かない（重複した分だけ届く）。

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{
    ChannelName, Connection, MessagePusher, OutboundEvent, RoomRegistry, SessionId, SessionStatus,
    SessionStatusUpdate, Timestamp, UserId,
};

use super::{error::RelayError, event_relay::RelayOutcome, exclude_sender};

pub struct SessionUpdateUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SessionUpdateUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 各参加者の個人チャンネルに状態を送る
    ///
    /// 送信者自身が参加者に含まれる場合でも、送信者の接続には送らない。
    pub async fn execute(
        &self,
        sender: &Connection,
        session_id: SessionId,
        status: SessionStatus,
        participants: Vec<UserId>,
    ) -> Result<RelayOutcome, RelayError> {
        let event = OutboundEvent::SessionStatusUpdate(SessionStatusUpdate {
            session_id: session_id.clone(),
            status,
            timestamp: Timestamp::new(self.clock.now_millis()),
        });

        let mut recipients = 0;
        for participant in &participants {
            let targets = exclude_sender(
                self.registry
                    .members(&ChannelName::personal(participant))
                    .await,
                &sender.id,
            );
            recipients += self.message_pusher.broadcast(targets, &event).await?;
        }

        tracing::info!(
            "Session '{}' is now '{}', notified {} participant(s) on {} connection(s)",
            session_id,
            status,
            participants.len(),
            recipients
        );
        Ok(RelayOutcome::Delivered {
            event: event.name(),
            recipients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Harness, drain, user};

    fn create_usecase(harness: &Harness) -> SessionUpdateUseCase {
        SessionUpdateUseCase::new(
            harness.registry.clone(),
            harness.pusher.clone(),
            harness.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_session_update_reaches_each_participant() {
        // テスト項目: 参加者それぞれに 1 件ずつ届き、参加者以外には届かない
        // given (前提条件):
        let harness = Harness::new();
        let (mentor, mut mentor_rx) = harness.connect("conn-m", "mentor").await;
        let (_u1, mut u1_rx) = harness.connect("conn-1", "u1").await;
        let (_u2, mut u2_rx) = harness.connect("conn-2", "u2").await;
        let (_u3, mut u3_rx) = harness.connect("conn-3", "u3").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let outcome = usecase
            .execute(
                &mentor,
                SessionId::try_from("s1").unwrap(),
                SessionStatus::Started,
                vec![user("u1"), user("u2")],
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            outcome,
            RelayOutcome::Delivered {
                event: "session_status_update",
                recipients: 2
            }
        );
        for rx in [&mut u1_rx, &mut u2_rx] {
            let frames = drain(rx);
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0]["event"], "session_status_update");
            assert_eq!(frames[0]["data"]["sessionId"], "s1");
            assert_eq!(frames[0]["data"]["status"], "started");
        }
        assert!(drain(&mut u3_rx).is_empty());
        assert!(drain(&mut mentor_rx).is_empty());
    }

    #[tokio::test]
    async fn test_session_update_with_duplicate_participant() {
        // テスト項目: 参加者リストの重複分だけ届く
        // given (前提条件):
        let harness = Harness::new();
        let (mentor, _mentor_rx) = harness.connect("conn-m", "mentor").await;
        let (_u1, mut u1_rx) = harness.connect("conn-1", "u1").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        usecase
            .execute(
                &mentor,
                SessionId::try_from("s1").unwrap(),
                SessionStatus::Ended,
                vec![user("u1"), user("u1")],
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut u1_rx).len(), 2);
    }

    #[tokio::test]
    async fn test_session_update_with_no_participants() {
        // テスト項目: 参加者が空の場合は何も送らずに成功する
        // given (前提条件):
        let harness = Harness::new();
        let (mentor, _mentor_rx) = harness.connect("conn-m", "mentor").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let result = usecase
            .execute(
                &mentor,
                SessionId::try_from("s1").unwrap(),
                SessionStatus::Paused,
                Vec::new(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(RelayOutcome::Delivered {
                event: "session_status_update",
                recipients: 0
            })
        );
    }
}
