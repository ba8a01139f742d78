//! DisposeCore Benchmarks
//!
//! Performance benchmarks for the DisposeCore library: the cost of the
//! unguarded and guarded modes for construction, registration and
//! teardown, and the behavior of the idempotence gate under contention.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
