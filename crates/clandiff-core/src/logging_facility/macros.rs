//! Operation lifecycle macros
//!
//! Every fetch, comparison and compare run is bracketed by a `start` event and
//! then exactly one `end` or `end_error` event carrying the same `op`. Domain
//! fields such as `clan_tag`, `run_id` or `diff_path` follow the fixed ones.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr) => {
        tracing::$level!(component = module_path!(), op = $op, event = $event)
    };
    ($level:ident, $op:expr, $event:expr, $($field:tt)*) => {
        tracing::$level!(component = module_path!(), op = $op, event = $event, $($field)*)
    };
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use clandiff_core::log_op_start;
/// log_op_start!("fetch_in_process");
/// log_op_start!("fetch_in_process", clan_tag = "#2PP");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use clandiff_core::log_op_end;
/// log_op_end!("compare_run", duration_ms = 42, run_id = "0190");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log the failed end of an operation
///
/// `$err` is anything `Clone + Into<ExError>`; it is cloned, not consumed.
/// The error's code, kind and subject (a clan tag, a difference path or a
/// file) are attached.
///
/// ```
/// # use clandiff_core::log_op_error;
/// # use clandiff_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::NotFound).with_subject("#QQQ");
/// log_op_error!("fetch_in_process", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = ::std::clone::Clone::clone(&$err).into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_subject = ex_err.subject()
            $(, $($field)*)?
        );
    }};
}
