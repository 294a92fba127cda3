// ── Snapshot store ──
//
// Last-known daemon state, swapped atomically on each completed refresh.

mod refresh;
mod state_cache;

pub(crate) use refresh::Refresh;
pub use state_cache::StateCache;
