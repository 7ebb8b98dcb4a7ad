/// The nine ingredients tracked by a kitchen's [`crate::Stock`](../pizzeria_kitchen/struct.Stock.html).
///
/// Declaration order is the fixed enum order used everywhere a stock is
/// serialised to a string (spec.md §6, "Stock string").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Ingredient {
    Dough = 0,
    Tomato = 1,
    Gruyere = 2,
    Ham = 3,
    Mushrooms = 4,
    Steak = 5,
    Eggplant = 6,
    GoatCheese = 7,
    ChiefLove = 8,
}

/// Total number of distinct ingredients; also the width of a stock string
/// and the length of [`Ingredient::ALL`].
pub const INGREDIENT_COUNT: usize = 9;

impl Ingredient {
    pub const ALL: [Ingredient; INGREDIENT_COUNT] = [
        Ingredient::Dough,
        Ingredient::Tomato,
        Ingredient::Gruyere,
        Ingredient::Ham,
        Ingredient::Mushrooms,
        Ingredient::Steak,
        Ingredient::Eggplant,
        Ingredient::GoatCheese,
        Ingredient::ChiefLove,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}
