//! Workspace-level scenarios for the JobFlow controller.
//!
//! Each scenario drives the reconcilers through the public API against the
//! in-memory store, advancing job phases between passes the way the batch
//! scheduler would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod prelude;

mod flow {
    mod dependencies;
    mod lifecycle;
    mod retention;
    mod status;
}

mod template {
    mod sync;
}
