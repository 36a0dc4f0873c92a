//! Call boundary shared by every public routine
//!
//! A panic inside a routine must not unwind into the caller: it is caught
//! here and reported as [`Error::Internal`].

use crate::error::{Error, Result};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error};

/// Run `body` as routine `routine`, mapping a panic to an internal error
pub(crate) fn api_boundary<F>(routine: &'static str, body: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            debug!(routine, status = %e.status(), error = %e, "routine rejected call");
            Err(e)
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!(routine, %msg, "internal fault caught at call boundary");
            Err(Error::Internal(format!("{routine}: {msg}")))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
