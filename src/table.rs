use log::debug;

use crate::alloc::try_vec;
use crate::error::OpmphmError;
use crate::graph::Hypergraph;
use crate::hash::hash;
#[cfg(feature = "serde")]
use crate::params::{MAX_ARITY, MIN_ARITY};

/// Which value each element's lookup must reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignOrder {
    /// The element's insertion index.
    #[default]
    Insertion,
    /// The order stored with [`Hypergraph::set_order`] / [`Hypergraph::set_orders`].
    Explicit,
}

/// Order-preserving minimal perfect hash map.
///
/// Query: `f(k) = (Σ_p values[p * component_size + hash(k, seeds[p]) % component_size]) % domain`
/// where `domain = r * component_size`.
///
/// A table starts empty ([`Opmphm::new`]), gets its values from
/// [`assign`](Self::assign) and is read-only afterwards. Rebuilding replaces
/// the values in one step; a failed rebuild leaves the previous contents intact.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opmphm {
    r: u8,
    component_size: usize,
    seeds: Vec<u32>,
    values: Vec<usize>, // len == r * component_size once built
}

impl Opmphm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solves the vertex values for a peeled graph and stores them in the table.
    ///
    /// Edges are processed in reverse removal order. Each one still has at
    /// least one unassigned vertex at that point; all but one of them are fixed
    /// at 0 and the last absorbs the difference, so that the edge's values sum
    /// to its target order modulo the domain.
    ///
    /// Explicit orders are reduced modulo the domain and must be distinct
    /// there, which is not checked here (see [`Hypergraph::validate_orders`]).
    /// Colliding orders alias at lookup time.
    ///
    /// # Panics
    /// If `graph` was not fully peeled by a successful `map`.
    pub fn assign(&mut self, graph: &Hypergraph, order: AssignOrder) -> Result<(), OpmphmError> {
        assert!(graph.is_acyclic(), "graph contains a cycle");
        let r = graph.arity() as usize;
        let cs = graph.component_size();
        let domain = graph.domain();

        let mut values = try_vec(domain, 0usize)?;
        let mut assigned = try_vec(domain, false)?;
        let mut seeds = try_vec(r, 0u32)?;
        seeds.copy_from_slice(graph.seeds());

        for &e in graph.removed().iter().rev() {
            let target = match order {
                AssignOrder::Insertion => e,
                AssignOrder::Explicit => graph.order(e),
            } % domain;
            let edge = graph.edge(e);

            let mut unassigned = 0usize;
            let mut sum = 0usize;
            for (p, &h) in edge.iter().enumerate() {
                let v = p * cs + h as usize;
                if assigned[v] {
                    sum = (sum + values[v]) % domain;
                } else {
                    unassigned += 1;
                }
            }
            debug_assert!(unassigned > 0, "edge {e} has no unassigned vertex");

            let mut p = 0;
            while unassigned > 1 {
                let v = p * cs + edge[p] as usize;
                if !assigned[v] {
                    assigned[v] = true;
                    unassigned -= 1;
                }
                p += 1;
            }
            for (q, &h) in edge.iter().enumerate().skip(p) {
                let v = q * cs + h as usize;
                if !assigned[v] {
                    values[v] = (target + domain - sum) % domain;
                    assigned[v] = true;
                }
            }
        }

        self.r = graph.arity();
        self.component_size = cs;
        self.seeds = seeds;
        self.values = values;
        debug!(
            "assigned {} edges over {r} partitions of {cs} vertices",
            graph.n()
        );
        Ok(())
    }

    /// Order of the element named `name`.
    ///
    /// Only meaningful for names the table was built from; other names map to
    /// some value in `[0, domain)`.
    ///
    /// # Panics
    /// If the table is not built or `name` is empty.
    #[inline]
    pub fn lookup(&self, name: &[u8]) -> usize {
        assert!(self.is_built(), "passed opmphm is empty");
        assert!(!name.is_empty(), "passed name is empty");
        let cs = self.component_size;
        let mut sum = 0usize;
        for (p, &seed) in self.seeds.iter().enumerate() {
            let h = hash(name, seed) as usize % cs;
            sum += self.values[p * cs + h];
        }
        sum % self.domain()
    }

    #[inline]
    pub fn lookup_str(&self, name: &str) -> usize {
        self.lookup(name.as_bytes())
    }

    /// Lookup by pre-computed coordinates, the counterpart of
    /// [`Hypergraph::map_coordinates`].
    ///
    /// # Panics
    /// If the table is not built, the coordinate count differs from the
    /// arity, or a coordinate is not below the component size.
    pub fn lookup_coordinates(&self, coords: &[u32]) -> usize {
        assert!(self.is_built(), "passed opmphm is empty");
        assert_eq!(coords.len(), self.r as usize, "expected one coordinate per partition");
        let cs = self.component_size;
        let mut sum = 0usize;
        for (p, &h) in coords.iter().enumerate() {
            assert!(
                (h as usize) < cs,
                "coordinate {h} out of range for component size {cs}"
            );
            sum += self.values[p * cs + h as usize];
        }
        sum % self.domain()
    }

    /// Releases the value table. Seeds and dimensions are kept.
    pub fn clear(&mut self) {
        self.values = Vec::new();
    }

    pub fn is_built(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn arity(&self) -> u8 {
        self.r
    }

    pub fn component_size(&self) -> usize {
        self.component_size
    }

    /// Range of lookup results, `r * component_size`.
    pub fn domain(&self) -> usize {
        self.r as usize * self.component_size
    }

    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Bytes held by the value table.
    pub fn size_in_bytes(&self) -> usize {
        self.values.len() * size_of::<usize>()
    }

    #[cfg(feature = "serde")]
    pub fn to_bytes(&self) -> Result<Vec<u8>, OpmphmError> {
        Ok(bincode::serialize(self)?)
    }

    /// Restores a table written by [`to_bytes`](Self::to_bytes).
    ///
    /// A built table must have a valid arity, one seed per partition,
    /// `r * component_size` values and every value inside the domain;
    /// anything else fails with [`OpmphmError::Corrupt`].
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OpmphmError> {
        let table: Self = bincode::deserialize(bytes)?;
        table.check_layout()?;
        Ok(table)
    }

    #[cfg(feature = "serde")]
    fn check_layout(&self) -> Result<(), OpmphmError> {
        if !self.is_built() {
            return Ok(());
        }
        if !(MIN_ARITY..=MAX_ARITY).contains(&self.r) {
            return Err(OpmphmError::Corrupt("arity out of range"));
        }
        if self.component_size == 0 {
            return Err(OpmphmError::Corrupt("component size is 0"));
        }
        if self.seeds.len() != self.r as usize {
            return Err(OpmphmError::Corrupt("seed count differs from arity"));
        }
        if (self.r as usize).checked_mul(self.component_size) != Some(self.values.len()) {
            return Err(OpmphmError::Corrupt("value count differs from domain"));
        }
        let domain = self.domain();
        if self.values.iter().any(|&v| v >= domain) {
            return Err(OpmphmError::Corrupt("value outside domain"));
        }
        Ok(())
    }
}
