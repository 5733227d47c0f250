//! A single inventory cell.

use satchel_protocol::SlotData;

/// One cell of the grid: an item id and how many units of it.
///
/// Fields are private so the emptiness rule holds everywhere: whenever the
/// id is empty or the quantity is zero, *both* are reset. There is no way
/// to observe a slot with an id and no units, or units with no id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventorySlot {
    item_id: String,
    quantity: u32,
}

impl InventorySlot {
    /// Creates a slot, normalizing `("", n)` and `(id, 0)` to empty.
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        let mut slot = Self {
            item_id: item_id.into(),
            quantity,
        };
        slot.normalize();
        slot
    }

    /// An empty slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The held item id, or `""` if the slot is empty.
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// The held quantity, or 0 if the slot is empty.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_empty(&self) -> bool {
        self.item_id.is_empty() || self.quantity == 0
    }

    /// Returns `true` if the slot holds at least one unit of `item_id`.
    pub fn holds(&self, item_id: &str) -> bool {
        !self.is_empty() && self.item_id == item_id
    }

    pub fn clear(&mut self) {
        self.item_id.clear();
        self.quantity = 0;
    }

    /// Converts to the wire form.
    pub fn to_data(&self) -> SlotData {
        SlotData::new(self.item_id.clone(), self.quantity)
    }

    /// Replaces the contents.
    pub(crate) fn set(&mut self, item_id: &str, quantity: u32) {
        self.item_id.clear();
        self.item_id.push_str(item_id);
        self.quantity = quantity;
        self.normalize();
    }

    /// Adds units of the item already held.
    pub(crate) fn grow(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_add(amount);
    }

    /// Removes up to `amount` units and returns how many were removed.
    /// Clears the slot when it runs out.
    pub(crate) fn take(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.quantity);
        self.quantity -= taken;
        self.normalize();
        taken
    }

    fn normalize(&mut self) {
        if self.item_id.is_empty() || self.quantity == 0 {
            self.clear();
        }
    }
}

impl From<&SlotData> for InventorySlot {
    fn from(data: &SlotData) -> Self {
        Self::new(data.item_id.clone(), data.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_zero_quantity_is_empty() {
        let slot = InventorySlot::new("iron_sword", 0);
        assert!(slot.is_empty());
        assert_eq!(slot.item_id(), "");
    }

    #[test]
    fn test_new_with_empty_id_has_no_quantity() {
        let slot = InventorySlot::new("", 7);
        assert!(slot.is_empty());
        assert_eq!(slot.quantity(), 0);
    }

    #[test]
    fn test_take_to_zero_clears_id() {
        let mut slot = InventorySlot::new("health_potion", 3);
        assert_eq!(slot.take(5), 3);
        assert!(slot.is_empty());
        assert_eq!(slot.item_id(), "");
    }

    #[test]
    fn test_take_partial_keeps_id() {
        let mut slot = InventorySlot::new("health_potion", 8);
        assert_eq!(slot.take(3), 3);
        assert_eq!(slot.quantity(), 5);
        assert!(slot.holds("health_potion"));
    }

    #[test]
    fn test_holds_checks_id_and_contents() {
        let slot = InventorySlot::new("magic_gem", 2);
        assert!(slot.holds("magic_gem"));
        assert!(!slot.holds("iron_sword"));
        assert!(!InventorySlot::empty().holds(""));
    }

    #[test]
    fn test_from_slot_data_normalizes() {
        let slot = InventorySlot::from(&SlotData::new("magic_gem", 0));
        assert_eq!(slot, InventorySlot::empty());
    }
}
