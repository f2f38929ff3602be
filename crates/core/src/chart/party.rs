//! Customer/supplier party tags carried on ledger entries.

use ledgerline_shared::types::{CustomerId, SupplierId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of counterparty with a subsidiary ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// Tracked on Accounts Receivable.
    Customer,
    /// Tracked on Accounts Payable.
    Supplier,
}

impl PartyKind {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
        }
    }
}

impl std::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The counterparty an entry is tagged with.
///
/// An entry carries at most one party; "no party" is `Option::<Party>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Party {
    /// A customer.
    Customer(CustomerId),
    /// A supplier.
    Supplier(SupplierId),
}

impl Party {
    /// Builds a party from its kind and raw id.
    #[must_use]
    pub fn from_parts(kind: PartyKind, id: Uuid) -> Self {
        match kind {
            PartyKind::Customer => Self::Customer(CustomerId::from_uuid(id)),
            PartyKind::Supplier => Self::Supplier(SupplierId::from_uuid(id)),
        }
    }

    /// Returns the party kind.
    #[must_use]
    pub const fn kind(&self) -> PartyKind {
        match self {
            Self::Customer(_) => PartyKind::Customer,
            Self::Supplier(_) => PartyKind::Supplier,
        }
    }

    /// Returns the raw id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Customer(id) => id.into_inner(),
            Self::Supplier(id) => id.into_inner(),
        }
    }

    /// Customer id, if this is a customer.
    #[must_use]
    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Self::Customer(id) => Some(*id),
            Self::Supplier(_) => None,
        }
    }

    /// Supplier id, if this is a supplier.
    #[must_use]
    pub fn supplier_id(&self) -> Option<SupplierId> {
        match self {
            Self::Supplier(id) => Some(*id),
            Self::Customer(_) => None,
        }
    }

    /// Rebuilds the tag from nullable customer/supplier columns.
    ///
    /// Returns `None` when neither is set. A row with both set violates the
    /// at-most-one-party rule; the customer wins.
    #[must_use]
    pub fn from_columns(customer_id: Option<Uuid>, supplier_id: Option<Uuid>) -> Option<Self> {
        match (customer_id, supplier_id) {
            (Some(id), _) => Some(Self::Customer(CustomerId::from_uuid(id))),
            (None, Some(id)) => Some(Self::Supplier(SupplierId::from_uuid(id))),
            (None, None) => None,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}
