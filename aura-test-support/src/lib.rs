//! Shared test utilities used across aura crates.

pub mod service {
    //! Scripted [`CompletionService`] stand-in that replays canned replies.
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use aura_core::{CompletionService, GenerationRequest, GenerationResponse, ServiceError};

    /// Owned copy of a request seen by [`ScriptedService`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        /// Model identifier sent with the request.
        pub model: String,
        /// System instruction sent with the request.
        pub instruction: String,
        /// User message built from the chunk.
        pub user_content: String,
        /// Name of the declared response schema.
        pub schema: String,
    }

    /// Replays one scripted reply per request, in order, and records every
    /// request it receives. Requests beyond the script fail with
    /// [`ServiceError::Upstream`].
    ///
    /// # Examples
    /// ```
    /// use aura_core::CompletionService;
    /// use aura_test_support::service::{ScriptedService, response};
    ///
    /// let service = ScriptedService::new(vec![Ok(response(&["a"], &["x"]))]);
    /// assert_eq!(service.name(), "scripted");
    /// assert!(service.requests().is_empty());
    /// ```
    #[derive(Debug, Default)]
    pub struct ScriptedService {
        replies: RefCell<VecDeque<Result<GenerationResponse, ServiceError>>>,
        requests: RefCell<Vec<RecordedRequest>>,
    }

    impl ScriptedService {
        /// Creates a service that answers with `replies` in order.
        #[must_use]
        pub fn new(replies: Vec<Result<GenerationResponse, ServiceError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        /// Returns the requests received so far, in arrival order.
        #[must_use]
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.borrow().clone()
        }
    }

    impl CompletionService for ScriptedService {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(
            &self,
            request: &GenerationRequest<'_>,
        ) -> Result<GenerationResponse, ServiceError> {
            self.requests.borrow_mut().push(RecordedRequest {
                model: request.model.to_owned(),
                instruction: request.instruction.to_owned(),
                user_content: request.user_content(),
                schema: request.schema.name.to_owned(),
            });
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::upstream("script exhausted")))
        }
    }

    /// Builds a description response from parallel name and description lists.
    #[must_use]
    pub fn response(names: &[&str], descriptions: &[&str]) -> GenerationResponse {
        GenerationResponse {
            attribute_names: names.iter().map(|name| (*name).to_owned()).collect(),
            descriptions: descriptions
                .iter()
                .map(|description| (*description).to_owned())
                .collect(),
            entity_name: None,
        }
    }
}

pub mod tracing {
    //! Recording layer utilities for capturing spans and events in tests.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::registry::LookupSpan;

    /// Layer that keeps closed spans and emitted events so tests can assert
    /// on instrumentation.
    ///
    /// # Examples
    /// ```
    /// use aura_test_support::tracing::RecordingLayer;
    ///
    /// let layer = RecordingLayer::default();
    /// assert!(layer.spans().is_empty());
    /// assert!(layer.events().is_empty());
    /// ```
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Emitted events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Returns the first closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<SpanRecord> {
            self.spans().into_iter().find(|span| span.name == name)
        }

        /// Returns the events whose `message` field equals `message`.
        #[must_use]
        pub fn events_with_message(&self, message: &str) -> Vec<EventRecord> {
            self.events()
                .into_iter()
                .filter(|event| event.message() == Some(message))
                .collect()
        }
    }

    /// Name and fields of a closed span.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the tracing metadata.
        pub name: String,
        /// Fields recorded on creation or later via `Span::record`.
        pub fields: HashMap<String, String>,
    }

    /// Level, target, and fields of an emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target (usually the module path).
        pub target: String,
        /// Structured fields, including `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Returns the rendered `message` field, if present.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    #[derive(Default)]
    struct SpanData {
        name: String,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            id: &tracing::span::Id,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut data = SpanData {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder {
                fields: &mut data.fields,
            });
            span.extensions_mut().insert(data);
        }

        fn on_record(
            &self,
            id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut extensions = span.extensions_mut();
            if let Some(data) = extensions.get_mut::<SpanData>() {
                values.record(&mut FieldRecorder {
                    fields: &mut data.fields,
                });
            }
        }

        fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(data) = span.extensions_mut().remove::<SpanData>() else {
                return;
            };
            self.spans
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(SpanRecord {
                    name: data.name,
                    fields: data.fields,
                });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder {
                fields: &mut fields,
            });
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(EventRecord {
                    level: *event.metadata().level(),
                    target: event.metadata().target().to_owned(),
                    fields,
                });
        }
    }

    struct FieldRecorder<'a> {
        fields: &'a mut HashMap<String, String>,
    }

    impl FieldRecorder<'_> {
        fn insert(&mut self, field: &Field, value: impl ToString) {
            self.fields.insert(field.name().to_owned(), value.to_string());
        }
    }

    impl Visit for FieldRecorder<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.insert(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.insert(field, value);
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.insert(field, value);
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.insert(field, value);
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.insert(field, value);
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.insert(field, value);
        }
    }
}
