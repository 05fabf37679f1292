//! Shared test utilities used across looptopo crates.

pub mod tracing {
    //! A subscriber layer that keeps spans and events for later assertions.
    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, MutexGuard},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

    /// Captures closed spans and emitted events with their structured fields.
    ///
    /// Install it with `tracing_subscriber::registry().with(layer.clone())`
    /// and keep the clone to read the snapshots afterwards.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Closed spans in completion order.
        ///
        /// # Examples
        /// ```
        /// use looptopo_test_support::tracing::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            lock(&self.spans).clone()
        }

        /// Events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            lock(&self.events).clone()
        }

        /// Closed spans called `name`.
        #[must_use]
        pub fn spans_named(&self, name: &str) -> Vec<SpanRecord> {
            lock(&self.spans)
                .iter()
                .filter(|span| span.name == name)
                .cloned()
                .collect()
        }

        /// Events emitted at exactly `level`.
        ///
        /// # Examples
        /// ```
        /// use looptopo_test_support::tracing::RecordingLayer;
        /// use tracing::Level;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.events_at(Level::WARN).is_empty());
        /// ```
        #[must_use]
        pub fn events_at(&self, level: Level) -> Vec<EventRecord> {
            lock(&self.events)
                .iter()
                .filter(|event| event.level == level)
                .cloned()
                .collect()
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// A closed span and the fields recorded on it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the metadata.
        pub name: String,
        /// Structured fields, rendered as strings.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Value of `name`, if recorded.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// An emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target (usually the module path).
        pub target: String,
        /// Structured fields, rendered as strings; the message is `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Value of `name`, if recorded.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }

        /// The formatted message, if any.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.field("message")
        }
    }

    struct OpenSpan {
        name: String,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = HashMap::new();
            attrs.record(&mut FieldRecorder(&mut fields));
            span.extensions_mut().insert(OpenSpan {
                name: attrs.metadata().name().to_owned(),
                fields,
            });
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut FieldRecorder(&mut open.fields));
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
                return;
            };
            lock(&self.spans).push(SpanRecord {
                name: open.name,
                fields: open.fields,
            });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldRecorder(&mut fields));
            lock(&self.events).push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            });
        }
    }

    /// Renders every field as a string; numbers and booleans go through
    /// `record_debug`, whose output matches `Display` for those types.
    struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldRecorder<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_owned(), value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.0.insert(field.name().to_owned(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_owned(), format!("{value:?}"));
        }
    }
}

pub mod lattice {
    //! Graph assertions over integer shift vectors.
    //!
    //! Vectors are plain coordinate slices so the helpers work for any crate
    //! without depending on its types.
    use std::collections::{BTreeSet, VecDeque};

    /// Whether `a` and `b` differ by exactly one in exactly one coordinate.
    ///
    /// # Examples
    /// ```
    /// use looptopo_test_support::lattice::unit_step;
    ///
    /// assert!(unit_step(&[0, -1, 0], &[0, 0, 0]));
    /// assert!(!unit_step(&[0, 0, 0], &[1, 1, 0]));
    /// ```
    #[must_use]
    pub fn unit_step(a: &[i64], b: &[i64]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut differing = a.iter().zip(b).filter(|(x, y)| x != y);
        match (differing.next(), differing.next()) {
            (Some((x, y)), None) => x.abs_diff(*y) == 1,
            _ => false,
        }
    }

    /// Number of nodes reached by a breadth-first walk over unit-step edges
    /// starting at `start`.
    #[must_use]
    pub fn reachable_from(nodes: &[Vec<i64>], start: usize) -> usize {
        if start >= nodes.len() {
            return 0;
        }
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for (index, candidate) in nodes.iter().enumerate() {
                if seen.contains(&index) {
                    continue;
                }
                if nodes
                    .get(current)
                    .is_some_and(|node| unit_step(node, candidate))
                {
                    seen.insert(index);
                    queue.push_back(index);
                }
            }
        }
        seen.len()
    }

    /// Whether every node is reachable from every other over unit-step edges.
    ///
    /// # Examples
    /// ```
    /// use looptopo_test_support::lattice::is_connected;
    ///
    /// assert!(is_connected(&[vec![0, 0], vec![0, 1], vec![1, 1]]));
    /// assert!(!is_connected(&[vec![0, 0], vec![1, 1]]));
    /// ```
    #[must_use]
    pub fn is_connected(nodes: &[Vec<i64>]) -> bool {
        nodes.is_empty() || reachable_from(nodes, 0) == nodes.len()
    }

    /// Whether all vectors are distinct.
    #[must_use]
    pub fn all_distinct(nodes: &[Vec<i64>]) -> bool {
        nodes.iter().collect::<BTreeSet<_>>().len() == nodes.len()
    }

}

pub mod ci;
