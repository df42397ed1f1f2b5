//! Memory management for the `inxml` parser and DOM.
//!
//! This crate provides [`MemoryPool`], a bump-pointer region allocator with:
//!
//! - **Fast allocation**: advancing a cursor, no per-object bookkeeping
//! - **Stable pointers**: allocations never move until the pool is cleared
//! - **An inline first block**: no heap traffic at all until 64 KiB of
//!   records have been carved out
//! - **Single-shot release**: [`MemoryPool::clear`] frees every dynamic
//!   block at once; there is no per-object free
//!
//! The pool is the backing store for every node, attribute and copied string
//! of a parsed document. Because allocation borrows the pool (`&'a self`
//! yields `&'a mut T`), the borrow checker guarantees the pool outlives
//! everything carved from it, and that `clear` cannot run while references
//! are live.
//!
//! # Example
//!
//! ```
//! use inxml_mem::MemoryPool;
//!
//! let pool = MemoryPool::new();
//! let a = pool.alloc(42u32);
//! let b = pool.alloc_str("interned for the pool's lifetime");
//!
//! assert_eq!(*a, 42);
//! assert_eq!(b.len(), 32);
//! ```

pub mod pool;

pub use pool::{
    AllocFn, DEFAULT_ALIGNMENT, DYNAMIC_POOL_SIZE, FreeFn, MemoryPool, PoolStats,
    STATIC_POOL_SIZE,
};
