// Messaging module - Lock-free event and notification streams

pub mod channels;
pub mod event;
pub mod notification;

pub use channels::{
    EventConsumer, EventProducer, NotificationConsumer, NotificationProducer, create_event_channel,
    create_notification_channel,
};
pub use event::EngineEvent;
pub use notification::{Notification, NotificationCategory, NotificationLevel};
