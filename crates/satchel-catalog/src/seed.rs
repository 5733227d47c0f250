//! The built-in starter items.

use crate::{Item, ItemType, Rarity};

/// The five items every session starts with when no catalog file is given.
pub fn seed_items() -> Vec<Item> {
    vec![
        Item::new("iron_sword", "Iron Sword")
            .with_description("A sturdy blade forged from iron.")
            .with_type(ItemType::Weapon)
            .with_rarity(Rarity::Common)
            .with_value(50),
        Item::new("health_potion", "Health Potion")
            .with_description("Restores 50 health when consumed.")
            .stackable(10)
            .with_type(ItemType::Consumable)
            .with_rarity(Rarity::Common)
            .with_value(25),
        Item::new("leather_armor", "Leather Armor")
            .with_description("Light armor made from tanned hide.")
            .with_type(ItemType::Armor)
            .with_rarity(Rarity::Uncommon)
            .with_value(75),
        Item::new("magic_gem", "Magic Gem")
            .with_description("A gem humming with arcane energy.")
            .stackable(5)
            .with_type(ItemType::Misc)
            .with_rarity(Rarity::Rare)
            .with_value(200),
        Item::new("iron_pickaxe", "Iron Pickaxe")
            .with_description("Breaks rock and ore.")
            .with_type(ItemType::Tool)
            .with_rarity(Rarity::Common)
            .with_value(40),
    ]
}
