//! opmphm — order-preserving minimal perfect hash map.
//!
//! - Build once on a set of **unique**, non-empty names (bytes/str).
//! - Each element becomes an edge of a random r-uniform r-partite hypergraph;
//!   peeling proves the graph acyclic and yields an order in which every edge
//!   has one free vertex.
//! - Vertex values are then solved so that a name's lookup reproduces its
//!   insertion index or a caller-chosen order: O(r) lookups into `[0, r * component_size)`.
//! - A cycle is an expected outcome: map again with fresh seeds, or let
//!   [`Builder`] do the retrying.
//!
//! ```
//! use opmphm::{AssignOrder, Hypergraph, MinStdRand, Opmphm, OpmphmError};
//!
//! let names = ["user:/a", "user:/b", "user:/c"];
//! let mut graph = Hypergraph::new(3, names.len(), 2.0)?;
//! let mut rng = MinStdRand::new(42);
//! while let Err(e) = graph.map(&names, |s: &&str| s.as_bytes(), &mut rng) {
//!     assert!(e.is_cycle());
//! }
//! let mut table = Opmphm::new();
//! table.assign(&graph, AssignOrder::Insertion)?;
//! assert_eq!(table.lookup_str("user:/b"), 1);
//! # Ok::<(), OpmphmError>(())
//! ```

mod alloc;
mod builder;
mod error;
mod graph;
pub mod hash;
pub mod params;
mod peel;
mod rng;
mod table;

pub use builder::{BuildConfig, Builder};
pub use error::OpmphmError;
pub use graph::Hypergraph;
pub use hash::hash;
pub use params::{minimum_load_factor, optimal_arity, optimal_load_factor};
pub use rng::MinStdRand;
pub use table::{AssignOrder, Opmphm};
