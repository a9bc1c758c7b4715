//! Demo integration tests
//!
//! - `server`: routes driven in-process through the router
//! - `client`: full runs against a server bound to a local port


pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
