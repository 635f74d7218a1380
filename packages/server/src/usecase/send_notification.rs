//! UseCase: 通知送信処理
//!
//! 通知は受信者の個人チャンネル（`user_<receiver_id>`）にだけ届く。
//! 受信者が接続していない場合は破棄され、保存はしない。

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{
    ChannelName, Connection, MessagePusher, MessageText, Notification, NotificationIdFactory,
    NotificationKind, NotificationTitle, OutboundEvent, RoomRegistry, Timestamp, UserId,
};

use super::{error::RelayError, event_relay::RelayOutcome, exclude_sender};

/// 通知送信のユースケース
pub struct SendNotificationUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendNotificationUseCase {
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

    /// 通知を作成して受信者の個人チャンネルに送る
    ///
    /// 通知には `notif_<millis>_<suffix>` 形式の ID と現在時刻が付与され、
    /// `read` は常に false で作成される。
    pub async fn execute(
        &self,
        sender: &Connection,
        receiver_id: UserId,
        kind: NotificationKind,
        title: NotificationTitle,
        text: MessageText,
    ) -> Result<RelayOutcome, RelayError> {
        let now = Timestamp::new(self.clock.now_millis());
        let notification = Notification {
            id: NotificationIdFactory::generate(now),
            sender_id: sender.user_id().clone(),
            receiver_id: receiver_id.clone(),
            kind,
            title,
            text,
            timestamp: now,
            read: false,
        };
        let event = OutboundEvent::NewNotification(notification);

        let targets = exclude_sender(
            self.registry
                .members(&ChannelName::personal(&receiver_id))
                .await,
            &sender.id,
        );
        let recipients = self.message_pusher.broadcast(targets, &event).await?;

        tracing::info!(
            "Notification '{}' from '{}' to '{}' ({} recipient(s))",
            kind,
            sender.user_id(),
            receiver_id,
            recipients
        );
        Ok(RelayOutcome::Delivered {
            event: event.name(),
            recipients,
        })
    }
}
