//! Media-library query engine
//!
//! The one load-bearing round trip: write the query payload into the
//! target, invoke it, read the mutated query struct back from the same
//! address, bulk-read the result array, marshal each element, and notify
//! the target to free the results it allocated.
//!
//! At most one query may be in flight at a time: the target mutates the
//! query struct it was handed synchronously, so concurrent queries would
//! race on it. Callers hold the controller mutably for the duration.

use crate::ipc::{ML_IPC_DB_FREEQUERYRESULTS, ML_IPC_DB_RUNQUERY, ML_IPC_DB_RUNQUERY_SEARCH};
use crate::marshal::resolve_pointers;
use crate::memory::RemoteMemoryChannel;
use crate::records::{
    item_record_descriptor, FromResolved, QueryDescriptor, ITEM_RECORD_SIZE,
    QUERY_DESCRIPTOR_SIZE,
};
use crate::traits::{Messenger, RemoteIo};
use crate::transport::MessageTransport;
use tracing::{debug, info};
use winampctl_common::{ItemRecord, RemoteAddress, Result};

/// Which query semantics the target applies to the payload text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Filter syntax, e.g. `artist has "opeth"`
    Literal,
    /// Keyword searched across every library field
    Keyword,
}

impl QueryMode {
    fn code(self) -> u32 {
        match self {
            QueryMode::Literal => ML_IPC_DB_RUNQUERY,
            QueryMode::Keyword => ML_IPC_DB_RUNQUERY_SEARCH,
        }
    }
}

/// Run one library query and snapshot the results.
///
/// `max_results` of 0 means unlimited. An empty result set is an empty
/// vector, not an error. The free-results notification is sent exactly
/// once for every query that reached the target, including empty ones;
/// it is the target's only chance to reclaim the result list.
pub fn run_query<I: RemoteIo, M: Messenger>(
    memory: &RemoteMemoryChannel<I>,
    transport: &MessageTransport<M>,
    text: &str,
    mode: QueryMode,
    max_results: i32,
) -> Result<Vec<ItemRecord>> {
    info!(query = text, ?mode, max_results, "running library query");

    let mut payload = text.as_bytes().to_vec();
    payload.push(0);
    let query_addr = memory.copy_to_target(&payload)?;

    let descriptor = QueryDescriptor::new(query_addr, max_results);
    let struct_addr = memory.copy_to_target(&descriptor.encode())?;

    transport.send_ml_message(mode.code(), struct_addr.raw())?;

    // The target mutated the struct it was handed; read it back from the
    // same address to learn where the result list landed.
    let outcome = read_results(memory, struct_addr);

    // Exactly one free notification per query, even when marshaling the
    // results failed partway: the target allocated the list either way.
    transport.send_ml_message(ML_IPC_DB_FREEQUERYRESULTS, struct_addr.raw())?;

    release_scratch(memory, query_addr);
    release_scratch(memory, struct_addr);

    let items = outcome?;
    info!(count = items.len(), "library query complete");
    Ok(items)
}

fn read_results<I: RemoteIo>(
    memory: &RemoteMemoryChannel<I>,
    struct_addr: RemoteAddress,
) -> Result<Vec<ItemRecord>> {
    let raw = memory.read_bytes(struct_addr, QUERY_DESCRIPTOR_SIZE)?;
    let populated = QueryDescriptor::decode(&raw)?;

    let count = populated.results.size.max(0) as usize;
    debug!(count, items = %populated.results.items, "query results header");
    if count == 0 || populated.results.items.is_null() {
        return Ok(Vec::new());
    }

    let bulk = memory.read_bytes(populated.results.items, count * ITEM_RECORD_SIZE)?;
    let desc = item_record_descriptor();

    // A degraded read may return fewer bytes than requested; only complete
    // record windows are marshaled.
    let mut items = Vec::with_capacity(count);
    for chunk in bulk.chunks_exact(ITEM_RECORD_SIZE).take(count) {
        let resolved = resolve_pointers(memory, chunk, &desc)?;
        items.push(ItemRecord::from_resolved(&resolved));
    }
    Ok(items)
}

/// Release a query-scoped scratch allocation. The results themselves are
/// target-owned and reclaimed only by the free message; these two buffers
/// are ours, so not freeing them would leak for the target's lifetime.
fn release_scratch<I: RemoteIo>(memory: &RemoteMemoryChannel<I>, addr: RemoteAddress) {
    if let Err(e) = memory.free(addr) {
        debug!(%addr, error = %e, "failed to release query scratch buffer");
    }
}
