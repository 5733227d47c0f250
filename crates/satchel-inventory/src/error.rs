//! Error types for the inventory engine.

/// Errors returned by the checked slot accessors.
///
/// The mutation algorithms themselves never return errors. They report
/// failure through their return value (`false`, or a zero quantity) and
/// leave the inventory untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// The index is outside `0..INVENTORY_SIZE`.
    #[error("slot index {0} out of range")]
    InvalidSlot(usize),
}
