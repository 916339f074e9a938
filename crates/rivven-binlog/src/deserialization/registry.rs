//! Event type -> body decoder mapping

use super::{
    EventDataDeserializer, FormatDescriptionEventDataDeserializer, GtidEventDataDeserializer,
    NullEventDataDeserializer, QueryEventDataDeserializer, RotateEventDataDeserializer,
    RowsEventDataDeserializer, RowsQueryEventDataDeserializer, TableMapEventDataDeserializer,
    XidEventDataDeserializer,
};
use crate::event::EventType;
use std::collections::HashMap;
use tracing::debug;

/// Body decoders by event type, with a fallback for unmapped types.
pub struct DeserializerRegistry {
    deserializers: HashMap<EventType, Box<dyn EventDataDeserializer>>,
    fallback: Box<dyn EventDataDeserializer>,
}

impl std::fmt::Debug for DeserializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.deserializers.keys().map(|t| t.code()).collect();
        types.sort_unstable();
        f.debug_struct("DeserializerRegistry")
            .field("event_types", &types)
            .finish_non_exhaustive()
    }
}

impl Default for DeserializerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl DeserializerRegistry {
    /// No mappings; every type resolves to [`NullEventDataDeserializer`].
    pub fn empty() -> Self {
        Self::with_fallback(NullEventDataDeserializer)
    }

    pub fn with_fallback<D: EventDataDeserializer + 'static>(fallback: D) -> Self {
        Self {
            deserializers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Built-in decoders for the standard event types.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(
            EventType::FormatDescription,
            FormatDescriptionEventDataDeserializer,
        );
        registry.register(EventType::Rotate, RotateEventDataDeserializer);
        registry.register(EventType::Query, QueryEventDataDeserializer);
        registry.register(EventType::TableMap, TableMapEventDataDeserializer);
        registry.register(EventType::Xid, XidEventDataDeserializer);
        registry.register(EventType::WriteRows, RowsEventDataDeserializer::write());
        registry.register(EventType::UpdateRows, RowsEventDataDeserializer::update());
        registry.register(EventType::DeleteRows, RowsEventDataDeserializer::delete());
        registry.register(
            EventType::ExtWriteRows,
            RowsEventDataDeserializer::write().with_extra_information(true),
        );
        registry.register(
            EventType::ExtUpdateRows,
            RowsEventDataDeserializer::update().with_extra_information(true),
        );
        registry.register(
            EventType::ExtDeleteRows,
            RowsEventDataDeserializer::delete().with_extra_information(true),
        );
        registry.register(EventType::RowsQuery, RowsQueryEventDataDeserializer);
        registry.register(EventType::Gtid, GtidEventDataDeserializer);
        registry
    }

    /// Map `event_type` to `deserializer`, replacing any previous mapping.
    pub fn register<D: EventDataDeserializer + 'static>(
        &mut self,
        event_type: EventType,
        deserializer: D,
    ) -> Option<Box<dyn EventDataDeserializer>> {
        let previous = self.deserializers.insert(event_type, Box::new(deserializer));
        if previous.is_some() {
            debug!("Replaced deserializer for {:?} events", event_type);
        }
        previous
    }

    /// Decoder for `event_type`, or the fallback.
    pub fn resolve(&self, event_type: EventType) -> &dyn EventDataDeserializer {
        self.deserializers
            .get(&event_type)
            .map(|d| d.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn contains(&self, event_type: EventType) -> bool {
        self.deserializers.contains_key(&event_type)
    }

    pub fn len(&self) -> usize {
        self.deserializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deserializers.is_empty()
    }
}
