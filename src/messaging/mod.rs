//! Priority message bus
//!
//! Decouples engine subsystems with string-coded messages. High priority
//! messages deliver synchronously from [`MessageBus::post`]; normal priority
//! messages queue and drain in FIFO order, capped per [`MessageBus::update`]
//! call so one frame cannot stall on an unbounded backlog.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::config::MessagingConfig;
use crate::scene::EntityKey;

/// Delivery priority of a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePriority {
    /// Delivered synchronously from `post`
    High,
    /// Queued and drained on `update`
    Normal,
}

/// Payload variants a message can carry
#[derive(Debug, Clone, PartialEq)]
pub enum MessageData {
    /// No payload
    Empty,
    /// Free-form text payload
    Text(String),
    /// Scalar payload
    Scalar(f32),
    /// Reference to a scene entity
    Entity(EntityKey),
}

/// A routed message
#[derive(Debug, Clone)]
pub struct Message {
    /// Routing code subscribers register against
    pub code: String,
    /// Delivery priority
    pub priority: MessagePriority,
    /// Payload
    pub data: MessageData,
}

impl Message {
    /// Create a message
    pub fn new(code: &str, priority: MessagePriority, data: MessageData) -> Self {
        Self {
            code: code.to_string(),
            priority,
            data,
        }
    }

    /// Create a normal-priority message with no payload
    pub fn signal(code: &str) -> Self {
        Self::new(code, MessagePriority::Normal, MessageData::Empty)
    }
}

/// Receiver of messages for a subscribed code
pub trait MessageHandler {
    /// Handle one delivered message
    fn handle(&mut self, message: &Message);
}

/// Shared handler registration
pub type SharedHandler = Rc<RefCell<dyn MessageHandler>>;

/// Routes messages to handlers by code
pub struct MessageBus {
    subscribers: HashMap<String, Vec<SharedHandler>>,
    queue: VecDeque<Message>,
    drain_cap: usize,
}

impl MessageBus {
    /// Create a bus from configuration
    pub fn new(config: &MessagingConfig) -> Self {
        Self {
            subscribers: HashMap::new(),
            queue: VecDeque::new(),
            drain_cap: config.queue_drain_cap,
        }
    }

    /// Number of messages waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Register a handler for a code
    ///
    /// Registering the same handler twice for one code logs a warning but
    /// still adds it; the handler will then receive each message twice.
    pub fn subscribe(&mut self, code: &str, handler: SharedHandler) {
        let handlers = self.subscribers.entry(code.to_string()).or_default();
        if handlers.iter().any(|h| Rc::ptr_eq(h, &handler)) {
            log::warn!("handler already subscribed to '{code}', adding duplicate registration");
        }
        handlers.push(handler);
    }

    /// Remove a handler registration for a code
    ///
    /// Removes a single registration. An unknown code or an unregistered
    /// handler logs a warning.
    pub fn unsubscribe(&mut self, code: &str, handler: &SharedHandler) {
        let Some(handlers) = self.subscribers.get_mut(code) else {
            log::warn!("unsubscribe from unknown code '{code}'");
            return;
        };
        match handlers.iter().position(|h| Rc::ptr_eq(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                if handlers.is_empty() {
                    self.subscribers.remove(code);
                }
            }
            None => log::warn!("unsubscribe of handler not registered for '{code}'"),
        }
    }

    /// Post a message
    ///
    /// High priority delivers to current subscribers before returning;
    /// normal priority joins the back of the queue.
    pub fn post(&mut self, message: Message) {
        match message.priority {
            MessagePriority::High => self.deliver(&message),
            MessagePriority::Normal => self.queue.push_back(message),
        }
    }

    /// Drain up to the configured cap of queued messages, oldest first
    pub fn update(&mut self) {
        for _ in 0..self.drain_cap {
            let Some(message) = self.queue.pop_front() else {
                break;
            };
            self.deliver(&message);
        }
    }

    fn deliver(&self, message: &Message) {
        let Some(handlers) = self.subscribers.get(&message.code) else {
            log::debug!("no subscribers for '{}'", message.code);
            return;
        };
        for handler in handlers {
            handler.borrow_mut().handle(message);
        }
    }
}
