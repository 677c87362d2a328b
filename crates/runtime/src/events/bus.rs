//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{AgentEvent, DirectorEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Directives and macro-state changes
    Director,
    /// Group-behavior broadcasts
    Agents,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::Director, Topic::Agents];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Director(DirectorEvent),
    Agents(AgentEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Director(_) => Topic::Director,
            Event::Agents(_) => Topic::Agents,
        }
    }
}

impl From<DirectorEvent> for Event {
    fn from(event: DirectorEvent) -> Self {
        Event::Director(event)
    }
}

impl From<AgentEvent> for Event {
    fn from(event: AgentEvent) -> Self {
        Event::Agents(event)
    }
}

/// One broadcast channel per topic, fixed at construction.
struct Channels {
    director: broadcast::Sender<Event>,
    agents: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Director => &self.director,
            Topic::Agents => &self.agents,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                director: broadcast::channel(capacity).0,
                agents: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use director_core::GroupBehavior;

    #[tokio::test]
    async fn events_route_by_topic() {
        let bus = EventBus::new();
        let mut agents = bus.subscribe(Topic::Agents);
        let mut director = bus.subscribe(Topic::Director);

        bus.publish(AgentEvent::BehaviorBroadcast {
            behavior: GroupBehavior::Scatter,
            agents: 4,
            session_time: 1.0,
        });

        let event = agents.recv().await.unwrap();
        assert_eq!(event.topic(), Topic::Agents);
        assert!(director.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::with_capacity(0);
        bus.publish(AgentEvent::BehaviorBroadcast {
            behavior: GroupBehavior::Cluster,
            agents: 0,
            session_time: 0.0,
        });
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 2);
    }
}
