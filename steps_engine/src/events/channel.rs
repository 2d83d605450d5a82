//! Stateless pub-sub for engine events.
//!
//! Handlers only see the event itself, never the engine's state. Each event is handled on its own task, so a slow
//! handler (a chat notification, say) does not hold up the producer or the next event.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    receiver: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for in-flight handlers to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Our own sender would keep the channel open forever.
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(event) = self.receiver.recv().await {
            trace!("📬️ Dispatching event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move { (handler)(event).await });
            while let Some(done) = jobs.try_join_next() {
                log_job_result(done);
            }
        }
        debug!("📬️ All producers are gone. Waiting for {} handler(s) to finish", jobs.len());
        while let Some(done) = jobs.join_next().await {
            log_job_result(done);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_job_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("📬️ An event handler did not complete: {e}");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to publish event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicI64, Ordering},
        Mutex,
    };

    use super::*;

    #[tokio::test]
    async fn every_published_event_is_handled_before_shutdown() {
        let _ = env_logger::try_init();
        let total = Arc::new(AtomicI64::new(0));
        let sink = total.clone();
        let handler: Handler<i64> = Arc::new(move |steps| {
            let sink = sink.clone();
            Box::pin(async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                sink.fetch_add(steps, Ordering::SeqCst);
            })
        });
        let event_handler = EventHandler::new(2, handler);
        let walks = event_handler.subscribe();
        let more_walks = event_handler.subscribe();
        tokio::spawn(async move {
            for steps in [100, 200, 300] {
                walks.publish_event(steps).await;
            }
        });
        tokio::spawn(async move {
            for steps in [1000, 2000] {
                more_walks.publish_event(steps).await;
            }
        });
        event_handler.start_handler().await;
        assert_eq!(total.load(Ordering::SeqCst), 3600);
    }

    #[tokio::test]
    async fn a_panicking_handler_does_not_stop_the_loop() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Handler<i64> = Arc::new(move |v| {
            let sink = sink.clone();
            Box::pin(async move {
                if v == 2 {
                    panic!("boom");
                }
                sink.lock().unwrap().push(v);
            })
        });
        let event_handler = EventHandler::new(4, handler);
        let producer = event_handler.subscribe();
        tokio::spawn(async move {
            for v in 1..=3 {
                producer.publish_event(v).await;
            }
        });
        event_handler.start_handler().await;
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 3]);
    }
}
