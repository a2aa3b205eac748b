use std::borrow::Borrow;

use ahash::RandomState;
use hashbrown::HashSet;
use log::{debug, warn};

use crate::error::OpmphmError;
use crate::graph::Hypergraph;
use crate::params::{optimal_arity, optimal_load_factor};
use crate::rng::MinStdRand;
use crate::table::{AssignOrder, Opmphm};

/// Build parameters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Hyperedge arity `r` in `[2, 10]`; `None` picks [`optimal_arity`].
    pub arity: Option<u8>,
    /// Load factor `c`; `None` picks [`optimal_load_factor`].
    pub load_factor: Option<f64>,
    /// Initial state of the seed generator.
    pub seed: u32,
    /// Mapping attempts before giving up.
    pub max_attempts: u32,
    /// Grow the load factor after this many consecutive cycles (0 = never).
    pub escalate_after: u32,
    /// Factor applied to the load factor on each escalation.
    pub escalation: f64,
    /// Reject duplicate explicit orders. Orders at or above the domain are
    /// always rejected.
    pub validate_orders: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            arity: None,
            load_factor: None,
            seed: 0x0C0F_FEE5,
            max_attempts: 64,
            escalate_after: 8,
            escalation: 1.5,
            validate_orders: true,
        }
    }
}

/// Retrying driver around [`Hypergraph`] and [`Opmphm::assign`].
#[derive(Debug, Clone, Default)]
pub struct Builder {
    cfg: BuildConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, cfg: BuildConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.cfg
    }

    /// Builds a table where each key looks up to its position in `keys`.
    /// Keys must be **unique** and non-empty.
    pub fn build<K, I>(&self, keys: I) -> Result<Opmphm, OpmphmError>
    where
        K: Borrow<[u8]>,
        I: IntoIterator<Item = K>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        let mut table = Opmphm::new();
        self.rebuild(&mut table, &keys, key_bytes::<K>, None)?;
        Ok(table)
    }

    /// Builds a table where each key looks up to the order paired with it.
    ///
    /// Orders must be below the domain of the first graph tried; larger ones
    /// fail with [`OpmphmError::OrderOutOfRange`] rather than wrap.
    pub fn build_ordered<K, I>(&self, entries: I) -> Result<Opmphm, OpmphmError>
    where
        K: Borrow<[u8]>,
        I: IntoIterator<Item = (K, usize)>,
    {
        let (keys, orders): (Vec<K>, Vec<usize>) = entries.into_iter().unzip();
        let mut table = Opmphm::new();
        self.rebuild(&mut table, &keys, key_bytes::<K>, Some(&orders))?;
        Ok(table)
    }

    /// (Re)builds `table` from arbitrary elements and a name accessor.
    ///
    /// With `orders`, element `i` looks up to `orders[i]`; otherwise to `i`.
    /// `table` is replaced only on success. Duplicate names fail with
    /// [`OpmphmError::DuplicateName`] since they can never be separated, and
    /// an order at or above the domain with [`OpmphmError::OrderOutOfRange`].
    ///
    /// # Panics
    /// If `elements` is empty or `orders` has a different length.
    pub fn rebuild<T, F>(
        &self,
        table: &mut Opmphm,
        elements: &[T],
        name: F,
        orders: Option<&[usize]>,
    ) -> Result<(), OpmphmError>
    where
        F: Fn(&T) -> &[u8],
    {
        let n = elements.len();
        assert!(n > 0, "empty key set is not supported");
        if let Some(orders) = orders {
            assert_eq!(orders.len(), n, "expected one order value per element");
        }
        check_unique(elements, &name)?;

        let r = self.cfg.arity.unwrap_or_else(|| optimal_arity(n));
        let mut c = self.cfg.load_factor.unwrap_or_else(|| optimal_load_factor(n));
        let mut rng = MinStdRand::new(self.cfg.seed);
        let mut graph = self.prepare(r, n, c, orders)?;
        let order = if orders.is_some() {
            AssignOrder::Explicit
        } else {
            AssignOrder::Insertion
        };

        for attempt in 1..=self.cfg.max_attempts {
            match graph.map(elements, &name, &mut rng) {
                Ok(()) => {
                    table.assign(&graph, order)?;
                    debug!(
                        "built opmphm for {n} elements (r = {r}, c = {c:.3}) after {attempt} attempt(s)"
                    );
                    return Ok(());
                }
                Err(OpmphmError::Cycle { removed, .. }) => {
                    debug!("attempt {attempt}: cycle after peeling {removed} of {n} edges");
                }
                Err(e) => return Err(e),
            }
            if self.cfg.escalate_after > 0 && attempt % self.cfg.escalate_after == 0 {
                c *= self.cfg.escalation;
                warn!("{attempt} cycles in a row for {n} elements, raising load factor to {c:.3}");
                graph = self.prepare(r, n, c, orders)?;
            }
        }
        Err(OpmphmError::Unresolvable {
            attempts: self.cfg.max_attempts,
        })
    }

    fn prepare(
        &self,
        r: u8,
        n: usize,
        c: f64,
        orders: Option<&[usize]>,
    ) -> Result<Hypergraph, OpmphmError> {
        let mut graph = Hypergraph::new(r, n, c)?;
        if let Some(orders) = orders {
            // The domain only grows on escalation, so the first graph decides.
            let domain = graph.domain();
            if let Some(&order) = orders.iter().find(|&&o| o >= domain) {
                return Err(OpmphmError::OrderOutOfRange { order, domain });
            }
            graph.set_orders(orders.iter().copied());
            if self.cfg.validate_orders {
                graph.validate_orders()?;
            }
        }
        Ok(graph)
    }
}

fn key_bytes<K: Borrow<[u8]>>(key: &K) -> &[u8] {
    <K as Borrow<[u8]>>::borrow(key)
}

fn check_unique<T, F>(elements: &[T], name: &F) -> Result<(), OpmphmError>
where
    F: Fn(&T) -> &[u8],
{
    let mut seen: HashSet<&[u8], RandomState> = HashSet::with_hasher(RandomState::new());
    seen.try_reserve(elements.len()).map_err(|_| OpmphmError::OutOfMemory {
        bytes: elements.len().saturating_mul(size_of::<&[u8]>()),
    })?;
    for element in elements {
        if !seen.insert(name(element)) {
            return Err(OpmphmError::DuplicateName);
        }
    }
    Ok(())
}
