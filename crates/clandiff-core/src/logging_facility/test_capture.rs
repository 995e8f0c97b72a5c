//! In-memory capture of lifecycle events for tests
//!
//! The capture layer flattens every event's fields to strings. Accessors pick
//! out the ones a clandiff run is traced by: op, event, run id, clan tag,
//! difference path and error code.

use crate::core_types::schema::{
    FIELD_CLAN_TAG, FIELD_DIFF_PATH, FIELD_ERR_CODE, FIELD_ERR_SUBJECT, FIELD_EVENT, FIELD_OP,
    FIELD_RUN_ID,
};
use crate::errors::ExErrorKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One captured event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn run_id(&self) -> Option<&str> {
        self.field(FIELD_RUN_ID)
    }

    pub fn clan_tag(&self) -> Option<&str> {
        self.field(FIELD_CLAN_TAG)
    }

    /// Difference path, falling back to the error subject of a mismatch
    pub fn diff_path(&self) -> Option<&str> {
        self.field(FIELD_DIFF_PATH).or_else(|| {
            if self.err_code() == Some(ExErrorKind::Mismatch.code()) {
                self.field(FIELD_ERR_SUBJECT)
            } else {
                None
            }
        })
    }

    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    /// True for the `event` phase of `op`
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

#[derive(Default)]
struct Fields(HashMap<String, String>);

impl Visit for Fields {
    // Integers and booleans arrive here too; their Debug form is the plain value.
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields: fields.0,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Shared view of everything captured so far
///
/// Every test in a binary sees the same buffer, so look events up by `op`,
/// run id or some other value unique to the test.
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events of one operation, in emission order
    pub fn lifecycle(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op))
            .collect()
    }

    /// Events stamped with `run_id`
    pub fn run(&self, run_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.run_id() == Some(run_id))
            .collect()
    }

    /// Paths reported by failed payload comparisons
    pub fn mismatch_paths(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.is("compare_payloads", "end_error"))
            .filter_map(|e| e.diff_path().map(str::to_string))
            .collect()
    }

    /// The first `event` phase of `op`
    ///
    /// # Panics
    ///
    /// Panics listing the captured ops when there is none.
    pub fn expect(&self, op: &str, event: &str) -> CapturedEvent {
        let events = self.events();
        match events.iter().find(|e| e.is(op, event)) {
            Some(found) => found.clone(),
            None => {
                let seen: Vec<&str> = events.iter().filter_map(|e| e.op()).collect();
                panic!("no {op}/{event} event; captured ops: {seen:?}");
            }
        }
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber
///
/// The first call installs it; every call returns a handle to the same buffer.
///
/// ```
/// use clandiff_core::logging_facility::test_capture::init_test_capture;
/// use clandiff_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("fetch_external", clan_tag = "#2PP");
/// assert_eq!(capture.expect("fetch_external", "start").clan_tag(), Some("#2PP"));
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            tracing_subscriber::registry().with(layer).init();
            TestCapture { events }
        })
        .clone()
}
