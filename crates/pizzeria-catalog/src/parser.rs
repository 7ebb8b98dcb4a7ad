use crate::error::CatalogError;
use crate::pizza::{Pizza, PizzaType, Size};
use regex::Regex;
use std::sync::OnceLock;

/// `<name> <size> x<count>`, case-insensitive on the name, per spec.md §6.
const SEGMENT_PATTERN: &str = r"^\s*([a-zA-Z]+)\s+(S|M|L|XL|XXL)\s+x([1-9][0-9]*)\s*$";

fn segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEGMENT_PATTERN).expect("static pattern is valid"))
}

/// Parses one CLI order line into a flat list of pizza descriptors.
///
/// The line is split on `;`, each segment matched against the order grammar,
/// and expanded into `count` copies of the described pizza, in segment
/// order (spec.md §6, §8 totality property). A single malformed or unknown
/// segment fails the whole line rather than silently skipping it, since the
/// spec treats parsing as a pure function with no partial-success mode.
pub fn parse_orders(line: &str) -> Result<Vec<Pizza>, CatalogError> {
    let re = segment_regex();
    let mut pizzas = Vec::new();

    for segment in line.split(';') {
        if segment.trim().is_empty() {
            continue;
        }
        let caps = re
            .captures(segment)
            .ok_or_else(|| CatalogError::MalformedSegment(segment.to_string()))?;

        let pizza_type = PizzaType::from_name(&caps[1])?;
        let size = Size::from_name(&caps[2])?;
        let count: i64 = caps[3]
            .parse()
            .map_err(|_| CatalogError::MalformedSegment(segment.to_string()))?;
        if count <= 0 {
            return Err(CatalogError::NonPositiveQuantity(count));
        }

        let pizza = Pizza::new(pizza_type, size);
        pizzas.extend(std::iter::repeat(pizza).take(count as usize));
    }

    Ok(pizzas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment_expands_to_count_copies() {
        let pizzas = parse_orders("margarita M x3").unwrap();
        assert_eq!(pizzas.len(), 3);
        assert!(pizzas
            .iter()
            .all(|p| p.pizza_type == PizzaType::Margarita && p.size == Size::M));
    }

    #[test]
    fn multiple_segments_preserve_order() {
        let pizzas = parse_orders("margarita S x1;regina L x2").unwrap();
        assert_eq!(pizzas.len(), 3);
        assert_eq!(pizzas[0].pizza_type, PizzaType::Margarita);
        assert_eq!(pizzas[1].pizza_type, PizzaType::Regina);
        assert_eq!(pizzas[2].pizza_type, PizzaType::Regina);
    }

    #[test]
    fn case_insensitive_pizza_name() {
        let pizzas = parse_orders("FANTASIA XXL x1").unwrap();
        assert_eq!(pizzas[0].pizza_type, PizzaType::Fantasia);
    }

    #[test]
    fn rejects_unknown_pizza_name() {
        let err = parse_orders("hawaiian M x1").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownPizzaName(_)));
    }

    #[test]
    fn rejects_malformed_segment() {
        assert!(parse_orders("margarita x1").is_err());
        assert!(parse_orders("margarita XXXL x1").is_err());
        assert!(parse_orders("margarita M x0").is_err());
    }

    #[test]
    fn whitespace_around_segments_is_tolerated() {
        let pizzas = parse_orders("  margarita   M   x1  ").unwrap();
        assert_eq!(pizzas.len(), 1);
    }
}
