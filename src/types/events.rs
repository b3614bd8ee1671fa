use std::sync::Arc;
use tokio::sync::broadcast;
pub use feedcore::types::events::*;

// The size of the broadcast channel buffer.
const CHANNEL_CAPACITY: usize = 100;

// Macro to generate EventBus fields and constructor
macro_rules! define_event_bus {
    ($(($field:ident, $type:ty)),* $(,)?) => {
        /// Typed event bus that provides separate broadcast channels for each event type.
        /// Sending with no subscriber attached is not an error.
        #[derive(Debug)]
        pub struct EventBus {
            $(
                pub $field: broadcast::Sender<$type>,
            )*
        }

        impl EventBus {
            pub fn new() -> Self {
                Self {
                    $(
                        $field: broadcast::channel(CHANNEL_CAPACITY).0,
                    )*
                }
            }
        }
    };
}

define_event_bus! {
    // Cache contents
    (list_updated, Arc<ListEvent>),

    // Transient failures for the presentation layer
    (fetch_failed, Arc<FetchFailed>),
    (mutation_failed, Arc<MutationFailed>),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub(crate) fn publish_list(&self, event: ListEvent) {
        let _ = self.list_updated.send(Arc::new(event));
    }

    pub(crate) fn publish_fetch_failed(&self, event: FetchFailed) {
        let _ = self.fetch_failed.send(Arc::new(event));
    }

    pub(crate) fn publish_mutation_failed(&self, event: MutationFailed) {
        let _ = self.mutation_failed.send(Arc::new(event));
    }
}
