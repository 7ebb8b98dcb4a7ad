use crate::error::CatalogError;
use crate::ingredient::Ingredient;

/// The four pizzas the pizzeria knows how to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PizzaType {
    Margarita = 0,
    Regina = 1,
    Americana = 2,
    Fantasia = 3,
}

/// The five sizes a pizza can be ordered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Size {
    S = 0,
    M = 1,
    L = 2,
    Xl = 3,
    Xxl = 4,
}

impl PizzaType {
    fn from_byte(b: u8) -> Result<Self, CatalogError> {
        match b {
            0 => Ok(PizzaType::Margarita),
            1 => Ok(PizzaType::Regina),
            2 => Ok(PizzaType::Americana),
            3 => Ok(PizzaType::Fantasia),
            other => Err(CatalogError::UnknownPizzaType(other)),
        }
    }

    /// Case-insensitive lookup by name, as it appears in an order line.
    pub(crate) fn from_name(name: &str) -> Result<Self, CatalogError> {
        match name.to_ascii_lowercase().as_str() {
            "margarita" => Ok(PizzaType::Margarita),
            "regina" => Ok(PizzaType::Regina),
            "americana" => Ok(PizzaType::Americana),
            "fantasia" => Ok(PizzaType::Fantasia),
            _ => Err(CatalogError::UnknownPizzaName(name.to_string())),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PizzaType::Margarita => "Margarita",
            PizzaType::Regina => "Regina",
            PizzaType::Americana => "Americana",
            PizzaType::Fantasia => "Fantasia",
        }
    }

    /// Every ingredient this pizza needs one unit of (spec.md §3).
    #[must_use]
    pub fn ingredients(self) -> &'static [Ingredient] {
        use Ingredient::*;
        match self {
            PizzaType::Margarita => &[Dough, Tomato, Gruyere],
            PizzaType::Regina => &[Dough, Tomato, Gruyere, Ham, Mushrooms],
            PizzaType::Americana => &[Dough, Tomato, Gruyere, Steak],
            PizzaType::Fantasia => &[Dough, Tomato, Eggplant, GoatCheese, ChiefLove],
        }
    }

    /// Base cooking time in whole seconds, before the multiplier is applied.
    #[must_use]
    pub fn base_cook_time_secs(self) -> u64 {
        match self {
            PizzaType::Margarita => 1,
            PizzaType::Regina => 2,
            PizzaType::Americana => 2,
            PizzaType::Fantasia => 4,
        }
    }
}

impl Size {
    fn from_byte(b: u8) -> Result<Self, CatalogError> {
        match b {
            0 => Ok(Size::S),
            1 => Ok(Size::M),
            2 => Ok(Size::L),
            3 => Ok(Size::Xl),
            4 => Ok(Size::Xxl),
            other => Err(CatalogError::UnknownSize(other)),
        }
    }

    pub(crate) fn from_name(name: &str) -> Result<Self, CatalogError> {
        match name {
            "S" => Ok(Size::S),
            "M" => Ok(Size::M),
            "L" => Ok(Size::L),
            "XL" => Ok(Size::Xl),
            "XXL" => Ok(Size::Xxl),
            _ => Err(CatalogError::MalformedSegment(name.to_string())),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
            Size::Xxl => "XXL",
        }
    }

}

/// A pizza descriptor: a type and a size (spec.md §3). Packs into a `u16`
/// with the type in the high byte and the size in the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pizza {
    pub pizza_type: PizzaType,
    pub size: Size,
}

impl Pizza {
    #[must_use]
    pub fn new(pizza_type: PizzaType, size: Size) -> Self {
        Self { pizza_type, size }
    }

    #[must_use]
    pub fn pack(self) -> u16 {
        u16::from(self.pizza_type as u8) << 8 | u16::from(self.size as u8)
    }

    pub fn unpack(packed: u16) -> Result<Self, CatalogError> {
        let pizza_type = PizzaType::from_byte((packed >> 8) as u8)?;
        let size = Size::from_byte((packed & 0xFF) as u8)?;
        Ok(Self { pizza_type, size })
    }

    /// Effective cooking time given the process-wide multiplier (spec.md §3,
    /// §9 "Global mutable state"): base time times the multiplier, with no
    /// size factor, rounded to whole milliseconds.
    #[must_use]
    pub fn effective_cook_time_ms(self, multiplier: f64) -> u64 {
        let base_ms = self.pizza_type.base_cook_time_secs() as f64 * 1000.0;
        (base_ms * multiplier).round() as u64
    }

    #[must_use]
    pub fn ingredients(self) -> &'static [Ingredient] {
        self.pizza_type.ingredients()
    }

    /// Human-readable completion line per spec.md §6: "A <Name>(<Size>) is
    /// ready!" (the vowel-sensitive "An" form is not implemented; the spec
    /// explicitly allows always using "A").
    #[must_use]
    pub fn display_ready_line(self) -> String {
        format!("A {}({}) is ready!", self.pizza_type.name(), self.size.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_pizzas() -> Vec<Pizza> {
        let types = [
            PizzaType::Margarita,
            PizzaType::Regina,
            PizzaType::Americana,
            PizzaType::Fantasia,
        ];
        let sizes = [Size::S, Size::M, Size::L, Size::Xl, Size::Xxl];
        types
            .iter()
            .flat_map(|&t| sizes.iter().map(move |&s| Pizza::new(t, s)))
            .collect()
    }

    #[test]
    fn pack_unpack_round_trip_for_every_legal_combination() {
        for pizza in all_pizzas() {
            let packed = pizza.pack();
            let unpacked = Pizza::unpack(packed).expect("legal combination unpacks");
            assert_eq!(unpacked.pizza_type, pizza.pizza_type);
            assert_eq!(unpacked.size, pizza.size);
        }
    }

    #[test]
    fn unpack_rejects_unknown_type_byte() {
        let packed = (0xFFu16) << 8 | 0;
        assert!(matches!(
            Pizza::unpack(packed),
            Err(CatalogError::UnknownPizzaType(0xFF))
        ));
    }

    #[test]
    fn unpack_rejects_unknown_size_byte() {
        let packed = (0u16) << 8 | 0xFF;
        assert!(matches!(
            Pizza::unpack(packed),
            Err(CatalogError::UnknownSize(0xFF))
        ));
    }

    #[test]
    fn effective_cook_time_scales_with_multiplier_only() {
        let p = Pizza::new(PizzaType::Margarita, Size::S);
        assert_eq!(p.effective_cook_time_ms(1.0), 1000);
        assert_eq!(p.effective_cook_time_ms(0.1), 100);

        // Size has no bearing on cooking time (spec.md §3: effective time is
        // base x multiplier only).
        let bigger = Pizza::new(PizzaType::Margarita, Size::L);
        assert_eq!(bigger.effective_cook_time_ms(1.0), 1000);
    }

    #[test]
    fn display_ready_line_matches_spec_format() {
        let p = Pizza::new(PizzaType::Regina, Size::Xl);
        assert_eq!(p.display_ready_line(), "A Regina(XL) is ready!");
    }
}
