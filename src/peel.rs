//! Acyclicity check by peeling.
//!
//! A vertex of degree 1 pins its only edge: that edge can be removed and
//! solved last. Removing it may drop neighbours to degree 1, which are peeled
//! in turn. The graph is acyclic iff every edge gets removed, i.e. its 2-core
//! is empty. The recursion is driven by an explicit worklist, so stack depth
//! does not grow with `n`.

use log::trace;

use crate::graph::{Hypergraph, NIL};

impl Hypergraph {
    /// Peels the graph, recording removed edges in [`removed`](Self::removed).
    ///
    /// Returns the number of edges removed by this run. The adjacency lists
    /// are consumed: running it again on a fully peeled graph removes nothing.
    pub fn peel(&mut self) -> usize {
        self.removed.clear();
        self.worklist.clear();
        for v in 0..self.vertices.len() {
            if self.vertices[v].degree == 1 {
                self.worklist.push(v);
                self.drain_worklist();
            }
        }
        trace!("peeled {} of {} edges", self.removed.len(), self.n);
        self.removed.len()
    }

    fn drain_worklist(&mut self) {
        let r = self.r as usize;
        while let Some(v) = self.worklist.pop() {
            // Degree may have dropped to 0 since `v` was queued.
            if self.vertices[v].degree != 1 {
                continue;
            }
            let e = self.vertices[v].first_edge;
            self.remove_edge(e);
            // Reverse push keeps partition 0 on top, matching depth-first recursion.
            for p in (0..r).rev() {
                let w = self.vertex_of(e, p);
                if self.vertices[w].degree == 1 {
                    self.worklist.push(w);
                }
            }
        }
    }

    /// Unlinks `e` from all of its vertices and appends it to the removal sequence.
    fn remove_edge(&mut self, e: usize) {
        let r = self.r as usize;
        self.removed.push(e);
        for p in 0..r {
            let w = self.vertex_of(e, p);
            let after = self.next_edge[e * r + p];
            let head = self.vertices[w].first_edge;
            if head == e {
                self.vertices[w].first_edge = after;
            } else {
                let mut cur = head;
                loop {
                    debug_assert_ne!(cur, NIL, "edge {e} missing from vertex {w}");
                    let link = cur * r + p;
                    if self.next_edge[link] == e {
                        self.next_edge[link] = after;
                        break;
                    }
                    cur = self.next_edge[link];
                }
            }
            self.vertices[w].degree -= 1;
        }
    }

    #[inline]
    fn vertex_of(&self, e: usize, p: usize) -> usize {
        p * self.component_size + self.coords[e * self.r as usize + p] as usize
    }
}

#[cfg(test)]
mod tests {
    use crate::error::OpmphmError;
    use crate::graph::Hypergraph;

    fn graph(r: u8, n: usize, c: f64, coords: &[u32]) -> (Hypergraph, Result<(), OpmphmError>) {
        let mut g = Hypergraph::new(r, n, c).unwrap();
        let res = g.map_coordinates(coords);
        (g, res)
    }

    #[test]
    fn chain_peels_completely() {
        // component size 2: e0 = (0,0,0), e1 = (1,0,1), e2 = (1,1,0)
        let (g, res) = graph(3, 3, 1.35, &[0, 0, 0, 1, 0, 1, 1, 1, 0]);
        res.unwrap();
        assert!(g.is_acyclic());
        let mut seen = g.removed().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
        // e0 is the only edge on vertex (0, 0).
        assert_eq!(g.removed()[0], 0);
    }

    #[test]
    fn duplicate_edges_form_a_core() {
        let (g, res) = graph(3, 3, 1.35, &[1, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert!(matches!(res, Err(OpmphmError::Cycle { removed: 0, n: 3 })));
        assert!(!g.is_acyclic());
    }

    #[test]
    fn core_survives_while_pendant_edges_peel() {
        // e0 and e1 share both vertices (a 2-cycle); e2 hangs off alone.
        let mut g = Hypergraph::new(2, 3, 2.0).unwrap();
        g.coords.copy_from_slice(&[0, 0, 0, 0, 1, 1]);
        for e in 0..3 {
            for p in 0..2 {
                let h = g.coords[e * 2 + p] as usize;
                let v = p * g.component_size + h;
                g.next_edge[e * 2 + p] = g.vertices[v].first_edge;
                g.vertices[v].first_edge = e;
                g.vertices[v].degree += 1;
            }
        }
        assert_eq!(g.peel(), 1);
        assert_eq!(g.removed(), &[2]);
        assert_eq!(g.degree(0, 0), 2);
        assert_eq!(g.degree(1, 0), 2);
    }

    #[test]
    fn degrees_drop_to_zero_after_full_peel() {
        let (g, res) = graph(3, 3, 1.35, &[0, 0, 0, 1, 0, 1, 1, 1, 0]);
        res.unwrap();
        for p in 0..3 {
            for h in 0..g.component_size() as u32 {
                assert_eq!(g.degree(p, h), 0);
            }
        }
        assert!(g.vertices.iter().all(|v| v.first_edge == super::NIL));
    }

    #[test]
    fn second_peel_is_a_no_op() {
        let (mut g, res) = graph(3, 3, 1.35, &[0, 0, 0, 1, 0, 1, 1, 1, 0]);
        res.unwrap();
        assert_eq!(g.peel(), 0);
        assert!(g.removed().is_empty());
    }

    #[test]
    fn single_edge_is_acyclic() {
        let (g, res) = graph(6, 1, 1.35, &[0; 6]);
        res.unwrap();
        assert_eq!(g.removed(), &[0]);
    }

    #[test]
    fn worklist_never_reallocates() {
        let n = 64;
        let r = 4usize;
        // A long chain: edge i shares partition-0 vertex with edge i+1 for even i.
        let mut coords = Vec::with_capacity(n * r);
        for i in 0..n {
            coords.push((i / 2) as u32);
            coords.extend(std::iter::repeat_n(i as u32, r - 1));
        }
        let mut g = Hypergraph::new(r as u8, n, r as f64).unwrap();
        let cap = g.worklist.capacity();
        g.map_coordinates(&coords).unwrap();
        assert_eq!(g.worklist.capacity(), cap);
    }
}
