//! Group (Namespace) Module
//!
//! The orchestration layer tying the local cache, the loader and the peers together.
//!
//! ## Control Flow
//! `Group::get(key)` -> local cache hit? return it. Otherwise enter `SingleFlight` keyed by
//! `key`; the single winning execution asks the peer picker for an owner, fetches from
//! that peer or falls back to the loader, and fills the local cache with loader results.
//!
//! ## Submodules
//! - **`group`**: The `Group` itself and the `Getter` loader contract.
//! - **`singleflight`**: Per-key in-flight call registry (cache stampede protection).
//! - **`registry`**: Process-wide name -> group lookup used by the peer handler.

pub mod group;
pub mod registry;
pub mod singleflight;
