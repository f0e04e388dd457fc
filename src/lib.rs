#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

/// A key-value map over the open-addressing `HashTable`.
///
/// This module provides a `HashMap` that hashes keys with a configurable
/// hasher builder and compares them with a configurable equality strategy.
pub mod hash_map;

/// The raw open-addressing table with linear probing and tombstones.
///
/// `HashTable` stores bare values and is driven by caller-supplied hashes and
/// equality predicates. It owns the slot layout, probing, growth and
/// compaction that `HashMap` builds on.
pub mod hash_table;

mod key_eq;

pub use error::ConfigError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
pub use key_eq::DefaultEq;
pub use key_eq::KeyEq;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used when none is chosen explicitly.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used when none is chosen explicitly.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}
