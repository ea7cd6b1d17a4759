use serde::{Deserialize, Serialize};
use tracing::debug;

/// The closed set of categories a transaction can belong to.
///
/// The derived ordering is declaration order, which is what ties are broken by when a month's
/// breakdown is sorted.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryEnum {
    #[default]
    Work,
    Gift,
    Food,
    Shopping,
    Transport,
    Entertainment,
    Health,
    Home,
    Services,
    Other,
}

serde_plain::derive_display_from_serialize!(CategoryEnum);
serde_plain::derive_fromstr_from_deserialize!(CategoryEnum);

/// Display metadata for a category: its label, the icon the UI should draw and its color as a
/// `#RRGGBB` string.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct CategoryInfo {
    pub display_name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub income: bool,
    pub expense: bool,
}

const fn info(
    display_name: &'static str,
    icon: &'static str,
    color: &'static str,
    income: bool,
    expense: bool,
) -> CategoryInfo {
    CategoryInfo {
        display_name,
        icon,
        color,
        income,
        expense,
    }
}

/// Every category in declaration order.
pub const ALL_CATEGORIES: [CategoryEnum; 10] = [
    CategoryEnum::Work,
    CategoryEnum::Gift,
    CategoryEnum::Food,
    CategoryEnum::Shopping,
    CategoryEnum::Transport,
    CategoryEnum::Entertainment,
    CategoryEnum::Health,
    CategoryEnum::Home,
    CategoryEnum::Services,
    CategoryEnum::Other,
];

impl CategoryEnum {
    /// Returns the static display metadata for this category.
    pub const fn info(&self) -> CategoryInfo {
        match self {
            CategoryEnum::Work => info("Work", "work", "#2E7D32", true, false),
            CategoryEnum::Gift => info("Gift", "card_giftcard", "#AD1457", true, true),
            CategoryEnum::Food => info("Food", "restaurant", "#EF6C00", false, true),
            CategoryEnum::Shopping => info("Shopping", "shopping_cart", "#6A1B9A", false, true),
            CategoryEnum::Transport => info("Transport", "directions_bus", "#1565C0", false, true),
            CategoryEnum::Entertainment => info("Entertainment", "movie", "#C62828", false, true),
            CategoryEnum::Health => info("Health", "favorite", "#00838F", false, true),
            CategoryEnum::Home => info("Home", "home", "#4E342E", false, true),
            CategoryEnum::Services => info("Services", "bolt", "#F9A825", false, true),
            CategoryEnum::Other => info("Other", "more_horiz", "#546E7A", true, true),
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.info().display_name
    }

    /// Looks up a category by its serialized name, e.g. `FOOD`. Unknown names fall back to the
    /// first declared category.
    pub fn from_name(name: &str) -> CategoryEnum {
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.to_string() == name)
            .unwrap_or_else(|| {
                debug!("Unknown category name '{name}', using {}", ALL_CATEGORIES[0]);
                ALL_CATEGORIES[0]
            })
    }

    /// Categories offered when recording an income.
    pub fn income_categories() -> impl Iterator<Item = CategoryEnum> {
        ALL_CATEGORIES.into_iter().filter(|c| c.info().income)
    }

    /// Categories offered when recording an expense.
    pub fn expense_categories() -> impl Iterator<Item = CategoryEnum> {
        ALL_CATEGORIES.into_iter().filter(|c| c.info().expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_is_declaration_order() {
        let mut sorted = ALL_CATEGORIES;
        sorted.sort();
        assert_eq!(sorted, ALL_CATEGORIES);
        assert!(CategoryEnum::Work < CategoryEnum::Food);
        assert!(CategoryEnum::Food < CategoryEnum::Other);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(CategoryEnum::Entertainment.to_string(), "ENTERTAINMENT");
        assert_eq!(
            CategoryEnum::from_str("TRANSPORT").unwrap(),
            CategoryEnum::Transport
        );
        assert!(CategoryEnum::from_str("transport").is_err());
    }

    #[test]
    fn test_from_name_falls_back_to_first() {
        assert_eq!(CategoryEnum::from_name("HEALTH"), CategoryEnum::Health);
        assert_eq!(CategoryEnum::from_name("nope"), CategoryEnum::Work);
    }

    #[test]
    fn test_income_and_expense_sets() {
        let income: Vec<_> = CategoryEnum::income_categories().collect();
        assert_eq!(
            income,
            vec![CategoryEnum::Work, CategoryEnum::Gift, CategoryEnum::Other]
        );
        assert!(CategoryEnum::expense_categories().all(|c| c != CategoryEnum::Work));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(CategoryEnum::Food.display_name(), "Food");
    }
}
