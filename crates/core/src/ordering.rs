//! Category ordering.
//!
//! Categories carry an integer `order`. Moving one up or down swaps its value
//! with the neighbour in that direction; the caller applies both updates in a
//! single atomic batch.

use crate::models::Category;
use crate::types::CategoryId;

/// Direction of a move in the category list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Parse the path segment used by the admin routes.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

/// The two `order` updates that make up one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub first: (CategoryId, i64),
    pub second: (CategoryId, i64),
}

/// Categories sorted for display: by `order`, then name for ties.
#[must_use]
pub fn sorted(categories: &[Category]) -> Vec<Category> {
    let mut sorted = categories.to_vec();
    sorted.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    sorted
}

/// Plan moving category `id` one step in `direction`.
///
/// Returns `None` if the id is unknown or the category is already at that
/// edge. When neighbours share the same `order` value (legacy data), whichever
/// of the two should come later gets that value plus one. The raised value may
/// then tie with the next category; [`sorted`] breaks that tie by name, so
/// the result only matches a plain swap when the names sort that way. Other
/// categories are never renumbered.
#[must_use]
pub fn plan_move(categories: &[Category], id: &CategoryId, direction: Direction) -> Option<Swap> {
    let sorted = sorted(categories);
    let index = sorted.iter().position(|c| &c.id == id)?;
    let neighbour_index = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down => index + 1,
    };
    let current = sorted.get(index)?;
    let neighbour = sorted.get(neighbour_index)?;

    let (current_order, neighbour_order) = if current.order == neighbour.order {
        match direction {
            Direction::Up => (neighbour.order, neighbour.order + 1),
            Direction::Down => (neighbour.order + 1, neighbour.order),
        }
    } else {
        (neighbour.order, current.order)
    };

    Some(Swap {
        first: (current.id.clone(), current_order),
        second: (neighbour.id.clone(), neighbour_order),
    })
}

/// `order` value for a newly created category: one past the current maximum.
#[must_use]
pub fn next_order(categories: &[Category]) -> i64 {
    categories
        .iter()
        .map(|c| c.order)
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(id: &str, order: i64) -> Category {
        Category {
            id: CategoryId::new(id),
            name: id.to_string(),
            slug: id.to_string(),
            image: None,
            order,
        }
    }

    fn sample() -> Vec<Category> {
        vec![category("lenses", 1), category("cameras", 0), category("audio", 2)]
    }

    #[test]
    fn test_move_up_swaps_with_previous() {
        let swap = plan_move(&sample(), &CategoryId::new("lenses"), Direction::Up).unwrap();
        assert_eq!(swap.first, (CategoryId::new("lenses"), 0));
        assert_eq!(swap.second, (CategoryId::new("cameras"), 1));
    }

    #[test]
    fn test_move_down_swaps_with_next() {
        let swap = plan_move(&sample(), &CategoryId::new("lenses"), Direction::Down).unwrap();
        assert_eq!(swap.first, (CategoryId::new("lenses"), 2));
        assert_eq!(swap.second, (CategoryId::new("audio"), 1));
    }

    #[test]
    fn test_edges_are_noops() {
        assert!(plan_move(&sample(), &CategoryId::new("cameras"), Direction::Up).is_none());
        assert!(plan_move(&sample(), &CategoryId::new("audio"), Direction::Down).is_none());
        assert!(plan_move(&sample(), &CategoryId::new("nope"), Direction::Up).is_none());
    }

    #[test]
    fn test_equal_orders_still_move() {
        let categories = vec![category("a", 5), category("b", 5)];
        let swap = plan_move(&categories, &CategoryId::new("b"), Direction::Up).unwrap();
        assert_eq!(swap.first, (CategoryId::new("b"), 5));
        assert_eq!(swap.second, (CategoryId::new("a"), 6));
    }

    #[test]
    fn test_equal_orders_resolved_by_name() {
        let mut categories = vec![category("a", 5), category("b", 5), category("c", 6)];
        let swap = plan_move(&categories, &CategoryId::new("b"), Direction::Up).unwrap();
        for (id, order) in [swap.first, swap.second] {
            categories.iter_mut().find(|c| c.id == id).unwrap().order = order;
        }

        let names: Vec<String> = sorted(&categories).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(categories.iter().filter(|c| c.order == 6).count(), 2);
    }

    #[test]
    fn test_next_order() {
        assert_eq!(next_order(&[]), 0);
        assert_eq!(next_order(&sample()), 3);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("up"), Some(Direction::Up));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
