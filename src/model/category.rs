//! The fixed category taxonomy. Records store only the `key`; display metadata is looked up here.

use serde::Serialize;

/// A category a transaction can be filed under.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Category {
    pub key: &'static str,
    pub name: &'static str,
    /// Name of the icon in the Feather icon set.
    pub icon: &'static str,
    pub color: &'static str,
}

/// All categories, in display order.
pub const CATEGORIES: &[Category] = &[
    Category {
        key: "purchases",
        name: "Purchases",
        icon: "shopping-bag",
        color: "#5636D3",
    },
    Category {
        key: "food",
        name: "Food",
        icon: "coffee",
        color: "#FF872C",
    },
    Category {
        key: "salary",
        name: "Salary",
        icon: "dollar-sign",
        color: "#12A454",
    },
    Category {
        key: "car",
        name: "Car",
        icon: "crosshair",
        color: "#E83F5B",
    },
    Category {
        key: "leisure",
        name: "Leisure",
        icon: "heart",
        color: "#26195C",
    },
    Category {
        key: "studies",
        name: "Studies",
        icon: "book",
        color: "#9C001A",
    },
];

/// Looks up a category by its key.
pub fn find(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}
