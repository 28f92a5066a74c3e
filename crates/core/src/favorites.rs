//! Favorite products stored on the user document.

use crate::types::ProductId;

/// Toggle `product_id` in a favorites list.
///
/// Returns `true` if the product is a favorite afterwards. The list never
/// contains duplicates; any pre-existing duplicates are removed together.
pub fn toggle(favorites: &mut Vec<ProductId>, product_id: &ProductId) -> bool {
    if favorites.contains(product_id) {
        favorites.retain(|id| id != product_id);
        false
    } else {
        favorites.push(product_id.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favorites = Vec::new();
        let id = ProductId::new("fx3");

        assert!(toggle(&mut favorites, &id));
        assert_eq!(favorites, vec![id.clone()]);

        assert!(!toggle(&mut favorites, &id));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_toggle_removes_duplicates() {
        let id = ProductId::new("fx3");
        let mut favorites = vec![id.clone(), ProductId::new("a7"), id.clone()];
        assert!(!toggle(&mut favorites, &id));
        assert_eq!(favorites, vec![ProductId::new("a7")]);
    }
}
