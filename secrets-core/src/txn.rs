/// Marker for whether a `RequestContext` carries an open transaction, or is
/// using the bare connection. The Design Notes describe this as "a
/// polymorphic dispatch over `{Conn, Tx}` — implement as a sum type with a
/// common query interface." The real relational store is out of scope for
/// this workspace (repositories are in-memory reference implementations),
/// so this enum has no payload today — it exists as the seam a real
/// `sqlx`/`sea-orm`-backed repository would extend with a live transaction
/// handle per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxScope {
    /// No transaction open; operate against the bare connection.
    Connection,
    /// A transaction is open and should be used for this and any nested
    /// repository call sharing this context.
    Transaction,
}

impl TxScope {
    pub fn in_transaction(self) -> bool {
        matches!(self, TxScope::Transaction)
    }
}
