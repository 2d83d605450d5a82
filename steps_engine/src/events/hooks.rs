use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, PurchaseCompletedEvent, WalkFinishedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub walk_finished_producer: Vec<EventProducer<WalkFinishedEvent>>,
    pub purchase_completed_producer: Vec<EventProducer<PurchaseCompletedEvent>>,
}

impl EventProducers {
    pub async fn publish_walk_finished(&self, event: WalkFinishedEvent) {
        for producer in &self.walk_finished_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_purchase_completed(&self, event: PurchaseCompletedEvent) {
        for producer in &self.purchase_completed_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_walk_finished: Option<EventHandler<WalkFinishedEvent>>,
    pub on_purchase_completed: Option<EventHandler<PurchaseCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_walk_finished = hooks.on_walk_finished.map(|f| EventHandler::new(buffer_size, f));
        let on_purchase_completed = hooks.on_purchase_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_walk_finished, on_purchase_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_walk_finished {
            result.walk_finished_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_purchase_completed {
            result.purchase_completed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_walk_finished {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_purchase_completed {
            tokio::spawn(handler.start_handler());
        }
    }
}

type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_walk_finished: Option<Handler<WalkFinishedEvent>>,
    pub on_purchase_completed: Option<Handler<PurchaseCompletedEvent>>,
}

impl EventHooks {
    pub fn on_walk_finished<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(WalkFinishedEvent) -> BoxedFuture) + Send + Sync + 'static {
        self.on_walk_finished = Some(Arc::new(f));
        self
    }

    pub fn on_purchase_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PurchaseCompletedEvent) -> BoxedFuture) + Send + Sync + 'static {
        self.on_purchase_completed = Some(Arc::new(f));
        self
    }
}
