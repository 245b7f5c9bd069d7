use std::collections::HashSet;
use std::sync::Arc;

use sqlx::SqlitePool;
use taskflow_websockets::LiveEvent;

use super::live::LivePublisher;
use super::models::{NewNotification, NotificationType};
use super::store::{NotificationStore, SqliteNotificationStore};
use crate::apps::activity::{ActivityStore, NewActivity, SqliteActivityStore};

/// What happened, rendered into a notification for each recipient.
///
/// # Examples
///
/// ```
/// use taskflow::apps::notifications::{Notice, NotificationType};
///
/// let notice = Notice::new(NotificationType::TaskCompleted, "Ada Lovelace", "Ship it", "t1");
/// assert_eq!(notice.title(), "Task Completed");
/// assert_eq!(notice.message(), "Ada Lovelace completed: Ship it");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
	pub kind: NotificationType,
	/// Display name of the user who caused the event.
	pub actor: String,
	/// Task title, or project name for invites.
	pub subject: String,
	pub entity_id: String,
}

impl Notice {
	pub fn new(
		kind: NotificationType,
		actor: impl Into<String>,
		subject: impl Into<String>,
		entity_id: impl Into<String>,
	) -> Self {
		Self {
			kind,
			actor: actor.into(),
			subject: subject.into(),
			entity_id: entity_id.into(),
		}
	}

	pub fn title(&self) -> &'static str {
		match self.kind {
			NotificationType::TaskAssigned => "Task Assigned",
			NotificationType::TaskUpdated => "Task Updated",
			NotificationType::TaskCompleted => "Task Completed",
			NotificationType::CommentAdded => "New Comment",
			NotificationType::ProjectInvite => "Project Invite",
			NotificationType::Mention => "You were mentioned",
		}
	}

	pub fn message(&self) -> String {
		let (actor, subject) = (&self.actor, &self.subject);
		match self.kind {
			NotificationType::TaskAssigned => format!("{actor} assigned you: {subject}"),
			NotificationType::TaskUpdated => format!("{actor} updated: {subject}"),
			NotificationType::TaskCompleted => format!("{actor} completed: {subject}"),
			NotificationType::CommentAdded => format!("{actor} commented on: {subject}"),
			NotificationType::ProjectInvite => format!("You were invited to: {subject}"),
			NotificationType::Mention => format!("{actor} mentioned you in: {subject}"),
		}
	}

	fn for_recipient(&self, user_id: &str) -> NewNotification {
		NewNotification {
			user_id: user_id.to_string(),
			kind: self.kind,
			title: self.title().to_string(),
			message: self.message(),
			entity_id: Some(self.entity_id.clone()),
		}
	}
}

/// Distinct candidates in first-seen order, without the actor.
///
/// # Examples
///
/// ```
/// use taskflow::apps::notifications::recipients;
///
/// let owner = "alice".to_string();
/// let assignees = vec!["bob".to_string(), "alice".to_string(), "carol".to_string()];
///
/// let to = recipients("carol", std::iter::once(&owner).chain(&assignees));
/// assert_eq!(to, vec!["alice".to_string(), "bob".to_string()]);
/// ```
pub fn recipients<'a>(actor: &str, candidates: impl IntoIterator<Item = &'a String>) -> Vec<String> {
	let mut seen = HashSet::new();
	candidates
		.into_iter()
		.filter(|id| id.as_str() != actor && seen.insert(id.as_str()))
		.cloned()
		.collect()
}

/// Best-effort fan-out of notifications, activity and live events.
///
/// None of the methods return an error. Each write is attempted on its own
/// and failures are logged at `warn`.
#[derive(Clone)]
pub struct Dispatcher {
	notifications: Arc<dyn NotificationStore>,
	activities: Arc<dyn ActivityStore>,
	live: Arc<dyn LivePublisher>,
}

impl Dispatcher {
	pub fn new(
		notifications: Arc<dyn NotificationStore>,
		activities: Arc<dyn ActivityStore>,
		live: Arc<dyn LivePublisher>,
	) -> Self {
		Self {
			notifications,
			activities,
			live,
		}
	}

	/// Dispatcher backed by the SQLite stores.
	pub fn sqlite(pool: SqlitePool, live: Arc<dyn LivePublisher>) -> Self {
		Self::new(
			Arc::new(SqliteNotificationStore::new(pool.clone())),
			Arc::new(SqliteActivityStore::new(pool)),
			live,
		)
	}

	/// Append an activity row.
	pub async fn record(&self, activity: NewActivity) {
		let (action, entity) = (activity.action, activity.entity);
		if let Err(err) = self.activities.record(activity).await {
			tracing::warn!(action, entity, error = %err, "failed to record activity");
		}
	}

	/// Persist `notice` for `recipient`, push it live and refresh the
	/// recipient's unread count.
	pub async fn notify(&self, recipient: &str, notice: &Notice) {
		let notification = match self.notifications.create(notice.for_recipient(recipient)).await {
			Ok(notification) => notification,
			Err(err) => {
				tracing::warn!(
					recipient,
					kind = ?notice.kind,
					error = %err,
					"failed to create notification"
				);
				return;
			}
		};

		match serde_json::to_value(&notification) {
			Ok(payload) => {
				self.live
					.publish(recipient, LiveEvent::NewNotification(payload))
					.await
			}
			Err(err) => tracing::warn!(recipient, error = %err, "failed to encode notification"),
		}
		self.push_unread_count(recipient).await;
	}

	/// [`notify`](Self::notify) each recipient in turn.
	pub async fn notify_all(&self, recipients: &[String], notice: &Notice) {
		for recipient in recipients {
			self.notify(recipient, notice).await;
		}
	}

	/// Tell `user_id`'s sockets that a notification was read.
	pub async fn notification_read(&self, user_id: &str, notification_id: &str) {
		self.live
			.publish(
				user_id,
				LiveEvent::NotificationRead {
					notification_id: notification_id.to_string(),
				},
			)
			.await;
	}

	/// Recount unread rows and push the result.
	pub async fn push_unread_count(&self, user_id: &str) {
		match self.notifications.unread_count(user_id).await {
			Ok(count) => {
				self.live
					.publish(user_id, LiveEvent::UnreadCount { count })
					.await
			}
			Err(err) => tracing::warn!(user_id, error = %err, "failed to count unread notifications"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::apps::activity::store::MockActivityStore;
	use crate::apps::notifications::live::MockLivePublisher;
	use crate::apps::notifications::models::Notification;
	use crate::apps::notifications::store::MockNotificationStore;
	use chrono::Utc;
	use rstest::rstest;
	use taskflow_core::exception::Error;

	fn stored(new: NewNotification) -> Notification {
		Notification {
			id: "n1".into(),
			kind: new.kind,
			title: new.title,
			message: new.message,
			user_id: new.user_id,
			entity_id: new.entity_id,
			is_read: false,
			created_at: Utc::now(),
		}
	}

	fn notice() -> Notice {
		Notice::new(NotificationType::TaskAssigned, "Ada Lovelace", "Write docs", "t1")
	}

	// ====================================================================
	// Templates
	// ====================================================================

	#[rstest]
	#[case(NotificationType::TaskAssigned, "Task Assigned", "Ada assigned you: Docs")]
	#[case(NotificationType::TaskUpdated, "Task Updated", "Ada updated: Docs")]
	#[case(NotificationType::TaskCompleted, "Task Completed", "Ada completed: Docs")]
	#[case(NotificationType::CommentAdded, "New Comment", "Ada commented on: Docs")]
	#[case(NotificationType::ProjectInvite, "Project Invite", "You were invited to: Docs")]
	#[case(NotificationType::Mention, "You were mentioned", "Ada mentioned you in: Docs")]
	fn test_templates(#[case] kind: NotificationType, #[case] title: &str, #[case] message: &str) {
		let notice = Notice::new(kind, "Ada", "Docs", "x");
		assert_eq!(notice.title(), title);
		assert_eq!(notice.message(), message);
	}

	#[rstest]
	fn test_recipients_deduplicate_and_skip_actor() {
		let candidates: Vec<String> = ["a", "b", "a", "actor", "c", "b"]
			.iter()
			.map(|s| s.to_string())
			.collect();

		assert_eq!(recipients("actor", &candidates), vec!["a", "b", "c"]);
	}

	// ====================================================================
	// Fan-out
	// ====================================================================

	/// Test: a created notification is pushed, followed by the recount.
	#[rstest]
	#[tokio::test]
	async fn test_notify_pushes_notification_then_count() {
		let mut notifications = MockNotificationStore::new();
		notifications
			.expect_create()
			.times(1)
			.returning(|new| Ok(stored(new)));
		notifications
			.expect_unread_count()
			.withf(|user| user == "bob")
			.times(1)
			.returning(|_| Ok(4));

		let mut live = MockLivePublisher::new();
		let mut sequence = mockall::Sequence::new();
		live.expect_publish()
			.withf(|user, event| user == "bob" && matches!(event, LiveEvent::NewNotification(_)))
			.times(1)
			.in_sequence(&mut sequence)
			.returning(|_, _| ());
		live.expect_publish()
			.withf(|user, event| user == "bob" && *event == LiveEvent::UnreadCount { count: 4 })
			.times(1)
			.in_sequence(&mut sequence)
			.returning(|_, _| ());

		let dispatcher = Dispatcher::new(
			Arc::new(notifications),
			Arc::new(MockActivityStore::new()),
			Arc::new(live),
		);

		dispatcher.notify("bob", &notice()).await;
	}

	/// Test: a failed insert pushes nothing and does not panic.
	#[rstest]
	#[tokio::test]
	async fn test_notify_swallows_store_failure() {
		let mut notifications = MockNotificationStore::new();
		notifications
			.expect_create()
			.returning(|_| Err(Error::Internal("no such table: notifications".into())));
		notifications.expect_unread_count().never();

		let mut live = MockLivePublisher::new();
		live.expect_publish().never();

		let dispatcher = Dispatcher::new(
			Arc::new(notifications),
			Arc::new(MockActivityStore::new()),
			Arc::new(live),
		);

		dispatcher.notify("bob", &notice()).await;
	}

	/// Test: one failing recipient does not stop the next one.
	#[rstest]
	#[tokio::test]
	async fn test_notify_all_continues_after_failure() {
		let mut notifications = MockNotificationStore::new();
		notifications.expect_create().times(2).returning(|new| {
			if new.user_id == "bob" {
				Err(Error::Internal("disk I/O error".into()))
			} else {
				Ok(stored(new))
			}
		});
		notifications.expect_unread_count().times(1).returning(|_| Ok(1));

		let mut live = MockLivePublisher::new();
		live.expect_publish()
			.withf(|user, _| user == "carol")
			.times(2)
			.returning(|_, _| ());

		let dispatcher = Dispatcher::new(
			Arc::new(notifications),
			Arc::new(MockActivityStore::new()),
			Arc::new(live),
		);

		dispatcher
			.notify_all(&["bob".to_string(), "carol".to_string()], &notice())
			.await;
	}

	#[rstest]
	#[tokio::test]
	async fn test_record_swallows_failure() {
		let mut activities = MockActivityStore::new();
		activities
			.expect_record()
			.times(1)
			.returning(|_| Err(Error::Internal("no such table: activities".into())));

		let dispatcher = Dispatcher::new(
			Arc::new(MockNotificationStore::new()),
			Arc::new(activities),
			Arc::new(MockLivePublisher::new()),
		);

		dispatcher
			.record(NewActivity::new("created", "Task", "t1").by("u1"))
			.await;
	}
}
