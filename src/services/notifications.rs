use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::entities::notification;
use crate::error::{AppError, AppResult};

const FEED_CAPACITY: usize = 256;

/// Live feed of newly inserted administrator notifications.
///
/// Rows are published only after the transaction that inserted them commits.
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<notification::Model>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<notification::Model> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notification: notification::Model) {
        let id = notification.id;
        match self.tx.send(notification) {
            Ok(receivers) => tracing::debug!(notification_id = %id, receivers, "Notification published"),
            // Nobody is listening; the row is still in the inbox.
            Err(_) => tracing::debug!(notification_id = %id, "No live notification subscribers"),
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows addressed to `recipient`; `None` is the administrator inbox.
fn addressed_to(recipient: Option<Uuid>) -> Select<notification::Entity> {
    let query = notification::Entity::find();
    match recipient {
        Some(user_id) => query.filter(notification::Column::UserId.eq(user_id)),
        None => query.filter(notification::Column::UserId.is_null()),
    }
}

/// Inbox for `recipient`, newest first.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    recipient: Option<Uuid>,
) -> AppResult<Vec<notification::Model>> {
    Ok(addressed_to(recipient)
        .order_by_desc(notification::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn unread_count<C: ConnectionTrait>(db: &C, recipient: Option<Uuid>) -> AppResult<u64> {
    Ok(addressed_to(recipient)
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await?)
}

/// Marks one of `recipient`'s notifications read. Already-read rows are
/// returned untouched; rows addressed to someone else are not found.
pub async fn mark_read<C: ConnectionTrait>(
    db: &C,
    recipient: Option<Uuid>,
    id: Uuid,
) -> AppResult<notification::Model> {
    let row = addressed_to(recipient)
        .filter(notification::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if row.is_read {
        return Ok(row);
    }

    let mut active: notification::ActiveModel = row.into();
    active.is_read = Set(true);
    Ok(active.update(db).await?)
}
