use ahash::RandomState;
use hashbrown::HashSet;
use log::debug;
use rand::RngCore;

use crate::alloc::{try_vec, try_with_capacity};
use crate::error::OpmphmError;
use crate::hash::hash;
use crate::params::{MAX_ARITY, MIN_ARITY};

/// End of an incident-edge list.
pub(crate) const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Vertex {
    /// Incident edges not yet peeled.
    pub(crate) degree: u32,
    /// Head of the incident-edge list, threaded through `Hypergraph::next_edge`.
    pub(crate) first_edge: usize,
}

impl Vertex {
    pub(crate) const EMPTY: Vertex = Vertex { degree: 0, first_edge: NIL };
}

/// Transient r-uniform r-partite hypergraph used while constructing an [`crate::Opmphm`].
///
/// Every element becomes one edge touching one vertex in each of the `r`
/// partitions. Edge `i` is the element at insertion index `i`. Per-edge data
/// lives in flat arrays of `n * r` entries indexed by `edge * r + partition`.
///
/// Peeling consumes the adjacency lists. After a successful [`map`](Self::map)
/// the graph holds the removal sequence needed by [`crate::Opmphm::assign`]; after
/// a cycle it has already been cleared and can be mapped again.
#[derive(Debug)]
pub struct Hypergraph {
    pub(crate) r: u8,
    pub(crate) n: usize,
    pub(crate) component_size: usize,
    pub(crate) seeds: Vec<u32>,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) coords: Vec<u32>,
    pub(crate) next_edge: Vec<usize>,
    pub(crate) orders: Vec<usize>,
    pub(crate) removed: Vec<usize>,
    pub(crate) worklist: Vec<usize>,
}

impl Hypergraph {
    /// Allocates a graph for `n` edges of arity `r` with load factor `c`.
    ///
    /// Each partition gets `max(1, ceil(c * n / r))` vertices.
    ///
    /// # Panics
    /// If `r` is outside `[2, 10]`, `n` is 0 or `c` is not a positive finite number.
    pub fn new(r: u8, n: usize, c: f64) -> Result<Self, OpmphmError> {
        assert!((MIN_ARITY..=MAX_ARITY).contains(&r), "r out of range [2,10]: {r}");
        assert!(n > 0, "n is 0");
        assert!(c > 0.0 && c.is_finite(), "load factor must be positive, got {c}");

        let ru = r as usize;
        let component_size = ((c * n as f64 / ru as f64).ceil() as usize).max(1);
        let slots = n.checked_mul(ru).ok_or(OpmphmError::OutOfMemory { bytes: usize::MAX })?;
        let total = component_size
            .checked_mul(ru)
            .ok_or(OpmphmError::OutOfMemory { bytes: usize::MAX })?;

        // Any failure below drops the buffers allocated so far.
        let seeds = try_vec(ru, 0u32)?;
        let vertices = try_vec(total, Vertex::EMPTY)?;
        let coords = try_vec(slots, 0u32)?;
        let next_edge = try_vec(slots, NIL)?;
        let mut orders = try_vec(n, 0usize)?;
        let removed = try_with_capacity(n)?;
        let worklist = try_with_capacity(slots)?;

        for (i, order) in orders.iter_mut().enumerate() {
            *order = i;
        }

        Ok(Self {
            r,
            n,
            component_size,
            seeds,
            vertices,
            coords,
            next_edge,
            orders,
            removed,
            worklist,
        })
    }

    /// Maps every element to an edge and checks the result for cycles.
    ///
    /// Draws one fresh seed per partition from `rng`, hashes each element's
    /// name once per partition and inserts the resulting edge. On
    /// [`OpmphmError::Cycle`] the vertex state is cleared before returning, so
    /// the same graph can be mapped again with the next seeds.
    ///
    /// # Panics
    /// If `elements.len()` differs from the graph's `n` or a name is empty.
    pub fn map<T, F, R>(&mut self, elements: &[T], name: F, rng: &mut R) -> Result<(), OpmphmError>
    where
        F: Fn(&T) -> &[u8],
        R: RngCore + ?Sized,
    {
        assert_eq!(elements.len(), self.n, "element count differs from the graph's n");
        for seed in self.seeds.iter_mut() {
            *seed = rng.next_u32();
        }

        let r = self.r as usize;
        for (i, element) in elements.iter().enumerate() {
            let key = name(element);
            assert!(!key.is_empty(), "element {i} has an empty name");
            for p in 0..r {
                let h = hash(key, self.seeds[p]) as usize % self.component_size;
                self.insert(i, p, h as u32);
            }
        }
        self.finish_mapping()
    }

    /// Maps edges from pre-computed coordinates, bypassing the hash function.
    ///
    /// `coords` holds `n * r` values, edge-major: edge `i` touches vertex
    /// `coords[i * r + p]` of partition `p`. Seeds are zeroed, so a table built
    /// from this graph is only meaningful through
    /// [`crate::Opmphm::lookup_coordinates`].
    ///
    /// # Panics
    /// If `coords` has the wrong length or a coordinate is not below `component_size`.
    pub fn map_coordinates(&mut self, coords: &[u32]) -> Result<(), OpmphmError> {
        let r = self.r as usize;
        assert_eq!(coords.len(), self.n * r, "expected n * r coordinates");
        self.seeds.fill(0);
        for (slot, &h) in coords.iter().enumerate() {
            assert!(
                (h as usize) < self.component_size,
                "coordinate {h} out of range for component size {}",
                self.component_size
            );
            self.insert(slot / r, slot % r, h);
        }
        self.finish_mapping()
    }

    fn insert(&mut self, edge: usize, partition: usize, h: u32) {
        let slot = edge * self.r as usize + partition;
        let v = partition * self.component_size + h as usize;
        self.coords[slot] = h;
        self.next_edge[slot] = self.vertices[v].first_edge;
        self.vertices[v].first_edge = edge;
        self.vertices[v].degree += 1;
    }

    fn finish_mapping(&mut self) -> Result<(), OpmphmError> {
        let removed = self.peel();
        if removed == self.n {
            return Ok(());
        }
        debug!(
            "cycle in {}-partite hypergraph: {removed} of {} edges peeled",
            self.r, self.n
        );
        self.clear();
        Err(OpmphmError::Cycle { removed, n: self.n })
    }

    /// Resets every vertex to degree 0 with an empty edge list and drops the removal sequence.
    pub fn clear(&mut self) {
        self.vertices.fill(Vertex::EMPTY);
        self.removed.clear();
        self.worklist.clear();
    }

    /// Stores an explicit order value for `edge`, used by [`crate::AssignOrder::Explicit`].
    pub fn set_order(&mut self, edge: usize, order: usize) {
        assert!(edge < self.n, "edge {edge} out of range (n = {})", self.n);
        self.orders[edge] = order;
    }

    /// Stores explicit order values for all edges, in insertion order.
    ///
    /// # Panics
    /// If `orders` does not yield exactly `n` values.
    pub fn set_orders<I>(&mut self, orders: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let mut count = 0;
        for (edge, order) in orders.into_iter().enumerate() {
            self.set_order(edge, order);
            count += 1;
        }
        assert_eq!(count, self.n, "expected one order value per edge");
    }

    /// Checks that the stored order values are distinct modulo [`domain`](Self::domain).
    ///
    /// [`crate::Opmphm::assign`] does not check this itself: colliding orders
    /// are accepted and alias at lookup time.
    pub fn validate_orders(&self) -> Result<(), OpmphmError> {
        let mut seen: HashSet<usize, RandomState> = HashSet::with_hasher(RandomState::new());
        seen.try_reserve(self.n).map_err(|_| OpmphmError::OutOfMemory {
            bytes: self.n.saturating_mul(size_of::<usize>()),
        })?;
        let domain = self.domain();
        for &order in &self.orders {
            if !seen.insert(order % domain) {
                return Err(OpmphmError::DuplicateOrder { order });
            }
        }
        Ok(())
    }

    pub fn arity(&self) -> u8 {
        self.r
    }

    /// Number of edges.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn component_size(&self) -> usize {
        self.component_size
    }

    /// Total vertex count, `r * component_size`; also the modulus of the assignment.
    pub fn domain(&self) -> usize {
        self.r as usize * self.component_size
    }

    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Coordinates of `edge`, one per partition.
    pub fn edge(&self, edge: usize) -> &[u32] {
        let r = self.r as usize;
        &self.coords[edge * r..(edge + 1) * r]
    }

    pub fn order(&self, edge: usize) -> usize {
        self.orders[edge]
    }

    /// Live degree of vertex `h` in `partition`.
    pub fn degree(&self, partition: usize, h: u32) -> usize {
        self.vertices[partition * self.component_size + h as usize].degree as usize
    }

    /// Edges in the order the last peeling run removed them.
    pub fn removed(&self) -> &[usize] {
        &self.removed
    }

    /// True when the last peeling run removed every edge.
    pub fn is_acyclic(&self) -> bool {
        self.removed.len() == self.n
    }
}
