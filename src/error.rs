use thiserror::Error;

/// Recoverable failures of an OPMPHM construction.
///
/// Precondition violations (empty names, `n == 0`, arity outside `[2, 10]`,
/// lookups on an unbuilt table) are not represented here: they panic.
#[derive(Debug, Error)]
pub enum OpmphmError {
    #[error("allocation of {bytes} bytes failed")]
    OutOfMemory { bytes: usize },
    /// The hypergraph has a non-empty 2-core. Retry with new seeds or a larger load factor.
    #[error("hypergraph contains a cycle ({removed} of {n} edges peeled)")]
    Cycle { removed: usize, n: usize },
    #[error("duplicate key detected during build")]
    DuplicateName,
    #[error("order value {order} collides with another element modulo the domain")]
    DuplicateOrder { order: usize },
    #[error("order value {order} does not fit the domain of {domain}")]
    OrderOutOfRange { order: usize, domain: usize },
    #[error("hypergraph was not acyclic after {attempts} attempts")]
    Unresolvable { attempts: u32 },
    /// A deserialized table violates the table layout.
    #[error("corrupt table: {0}")]
    Corrupt(&'static str),
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serde(#[from] Box<bincode::ErrorKind>),
}

impl OpmphmError {
    /// True for outcomes a caller is expected to retry with fresh seeds.
    pub fn is_cycle(&self) -> bool {
        matches!(self, OpmphmError::Cycle { .. })
    }
}
