/*
 * Copyright (c) 2003-2023. Trevor Campbell and others.
 *
 * This file is part of Kelpie FMC.
 *
 * Kelpie FMC is free software; you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 2 of the License, or
 * (at your option) any later version.
 *
 * Kelpie FMC is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Kelpie FMC; if not, write to the Free Software
 * Foundation, Inc., 59 Temple Place, Suite 330, Boston, MA  02111-1307  USA
 *
 * Contributors:
 *      Trevor Campbell
 *
 */

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use async_channel::{Receiver, Sender, TrySendError};
use log::warn;

use crate::model::route::RouteFlag;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventType {
    NavdataLoaded,
    RouteChanged,
    ActiveWaypointChanged,
}

/// Describes a change to the lateral route.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RouteChange {
    pub flag: RouteFlag,
    pub direct_change: bool,
    pub origin: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Event {
    NavdataLoaded,
    RouteChanged(RouteChange),
    ActiveWaypointChanged(usize),
}

impl Event {
    fn event_type(&self) -> EventType {
        match self {
            Event::NavdataLoaded => EventType::NavdataLoaded,
            Event::RouteChanged(_) => EventType::RouteChanged,
            Event::ActiveWaypointChanged(_) => EventType::ActiveWaypointChanged,
        }
    }
}

/// Fans events out to every registered receiver. Share it between routes with an `Arc`.
#[derive(Default)]
pub struct EventManager {
    listeners: RwLock<HashMap<EventType, Vec<Sender<Event>>>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    // Registers a listener for multiple `event_types`.
    // Returns a receiver that will receive copies of those events when notified.
    pub fn register_listener(&self, event_types: &[EventType]) -> Option<Receiver<Event>> {
        let (tx, rx) = async_channel::unbounded::<Event>();
        self.add_sender(event_types, tx)?;
        Some(rx)
    }

    /// Like [`EventManager::register_listener`] but events beyond `capacity` unread ones are dropped.
    pub fn register_bounded_listener(
        &self,
        event_types: &[EventType],
        capacity: usize,
    ) -> Option<Receiver<Event>> {
        let (tx, rx) = async_channel::bounded::<Event>(capacity.max(1));
        self.add_sender(event_types, tx)?;
        Some(rx)
    }

    fn add_sender(&self, event_types: &[EventType], tx: Sender<Event>) -> Option<()> {
        let mut listeners = self.listeners.write().ok()?;
        for event_type in event_types.iter() {
            listeners.entry(*event_type).or_default().push(tx.clone());
        }
        Some(())
    }

    /// Notify only listeners registered for the specific `ev`.
    pub fn notify_listeners(&self, ev: Event) {
        let key = ev.event_type();

        if let Ok(listeners) = self.listeners.read() {
            if let Some(vec) = listeners.get(&key) {
                for listener in vec.iter() {
                    match listener.try_send(ev.clone()) {
                        Ok(_) => {}
                        Err(TrySendError::Closed(_)) => {
                            warn!("Listener channel closed");
                        }
                        Err(TrySendError::Full(_)) => {}
                    }
                }
            }
        }
        if let Ok(mut listeners) = self.listeners.write() {
            // Remove closed senders and remove empty vectors
            listeners.retain(|_, v| {
                v.retain(|l| !l.is_closed());
                !v.is_empty()
            });
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .map(|l| l.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use async_channel::TryRecvError;

    use crate::model::route::RouteFlag;

    use super::*;

    fn change(origin: &str) -> Event {
        Event::RouteChanged(RouteChange {
            flag: RouteFlag::Normal,
            direct_change: false,
            origin: origin.to_string(),
        })
    }

    #[test]
    fn test_notify_listeners() {
        let manager = EventManager::new();

        let receiver = manager.register_listener(&[EventType::RouteChanged]).unwrap();
        manager.notify_listeners(change("test"));

        match receiver.try_recv() {
            Ok(event) => assert_eq!(event, change("test")),
            Err(_) => panic!("Expected event not received"),
        }
    }

    #[test]
    fn test_only_registered_types() {
        let manager = EventManager::new();

        let receiver = manager
            .register_listener(&[EventType::ActiveWaypointChanged])
            .unwrap();
        manager.notify_listeners(change("ignored"));
        manager.notify_listeners(Event::ActiveWaypointChanged(3));

        assert_eq!(receiver.try_recv().unwrap(), Event::ActiveWaypointChanged(3));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_notify_multiple_listeners() {
        let manager = EventManager::new();

        let receiver1 = manager.register_listener(&[EventType::NavdataLoaded]).unwrap();
        let receiver2 = manager
            .register_listener(&[EventType::NavdataLoaded, EventType::RouteChanged])
            .unwrap();
        manager.notify_listeners(Event::NavdataLoaded);

        assert_eq!(receiver1.try_recv().unwrap(), Event::NavdataLoaded);
        assert_eq!(receiver2.try_recv().unwrap(), Event::NavdataLoaded);
    }

    #[test]
    fn test_listener_channel_closed() {
        let manager = EventManager::new();

        let receiver = manager.register_listener(&[EventType::RouteChanged]).unwrap();
        drop(receiver);
        assert_eq!(manager.listener_count(), 1);

        manager.notify_listeners(change("closed"));
        assert_eq!(manager.listener_count(), 0);
    }

    #[test]
    fn test_listener_channel_full() {
        let manager = EventManager::new();

        let rx = manager
            .register_bounded_listener(&[EventType::ActiveWaypointChanged], 1)
            .unwrap();
        manager.notify_listeners(Event::ActiveWaypointChanged(1));
        manager.notify_listeners(Event::ActiveWaypointChanged(2));

        assert_eq!(rx.try_recv().unwrap(), Event::ActiveWaypointChanged(1));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
