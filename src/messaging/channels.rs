// Lock-free communication channels

use crate::messaging::event::EngineEvent;
use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

pub type EventProducer = ringbuf::HeapProd<EngineEvent>;
pub type EventConsumer = ringbuf::HeapCons<EngineEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<EngineEvent>::new(capacity);
    rb.split()
}

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}
