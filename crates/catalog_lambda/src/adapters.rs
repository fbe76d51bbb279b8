pub mod callback;
pub mod catalog_store;
pub mod dynamodb;
pub mod seed_invoker;

/// Runs an SDK future to completion from the synchronous adapter traits.
/// Requires the multi-threaded runtime the Lambda binaries start.
pub(crate) fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
