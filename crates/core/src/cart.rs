//! Rental cart lines, guest-to-account merging, and pricing.
//!
//! A cart is an ordered list of lines, at most one per product. Guests keep
//! their cart in the session; signed-in users keep it in `users/{uid}.cart`.
//! When a guest signs in the two are merged with [`Cart::merge_guest`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::{Price, ProductId};

/// Maximum units of one product per cart line.
pub const MAX_QUANTITY: u32 = 10;

/// Maximum rental duration in days.
pub const MAX_RENTAL_DAYS: u32 = 60;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default = "default_days")]
    pub days: u32,
}

const fn default_days() -> u32 {
    1
}

impl CartItem {
    /// Create a line with quantity and days clamped to their allowed ranges.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32, days: u32) -> Self {
        Self {
            product_id,
            quantity: clamp_quantity(quantity),
            days: clamp_days(days),
        }
    }
}

fn clamp_quantity(quantity: u32) -> u32 {
    quantity.clamp(1, MAX_QUANTITY)
}

fn clamp_days(days: u32) -> u32 {
    days.clamp(1, MAX_RENTAL_DAYS)
}

/// Ordered collection of cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from stored lines, folding any duplicate product lines.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            cart.add(item.product_id, item.quantity, item.days);
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add units of a product.
    ///
    /// An existing line has its quantity increased (clamped to
    /// [`MAX_QUANTITY`]) and its rental days replaced; otherwise a new line is
    /// appended.
    pub fn add(&mut self, product_id: ProductId, quantity: u32, days: u32) {
        if let Some(line) = self.line_mut(&product_id) {
            line.quantity = clamp_quantity(line.quantity.saturating_add(quantity));
            line.days = clamp_days(days);
        } else {
            self.items.push(CartItem::new(product_id, quantity, days));
        }
    }

    /// Set quantity and days for an existing line.
    ///
    /// A quantity of zero removes the line. Returns `false` if the product is
    /// not in the cart.
    pub fn update(&mut self, product_id: &ProductId, quantity: u32, days: Option<u32>) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        let Some(line) = self.line_mut(product_id) else {
            return false;
        };
        line.quantity = clamp_quantity(quantity);
        if let Some(days) = days {
            line.days = clamp_days(days);
        }
        true
    }

    /// Remove a product's line. Returns `false` if it was not present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Merge a guest cart into an account cart.
    ///
    /// Lines are matched by product. A guest line replaces the matching
    /// account line (the guest cart holds the most recent edits); unmatched
    /// guest lines are appended in guest order. Account line order is kept.
    #[must_use]
    pub fn merge_guest(account: Self, guest: Self) -> Self {
        let mut merged = account;
        for line in guest.items {
            if let Some(existing) = merged.line_mut(&line.product_id) {
                *existing = line;
            } else {
                merged.items.push(line);
            }
        }
        merged
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }
}

/// A cart line joined with its product.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product: Product,
    pub quantity: u32,
    pub days: u32,
    pub line_total: Price,
}

/// Priced view of a cart.
#[derive(Debug, Clone, Default)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Price,
    pub item_count: u32,
}

/// Join cart lines with products and total them.
///
/// Lines whose product no longer exists are dropped.
#[must_use]
pub fn price_cart(cart: &Cart, products: &[Product]) -> PricedCart {
    let by_id: HashMap<&ProductId, &Product> = products.iter().map(|p| (&p.id, p)).collect();

    let lines: Vec<PricedLine> = cart
        .items()
        .iter()
        .filter_map(|item| {
            let product = by_id.get(&item.product_id)?;
            Some(PricedLine {
                line_total: product.daily_price().times(item.quantity, item.days),
                product: (*product).clone(),
                quantity: item.quantity,
                days: item.days,
            })
        })
        .collect();

    let subtotal = lines
        .iter()
        .fold(Price::default(), |acc, line| acc + line.line_total);
    let item_count = lines.iter().map(|line| line.quantity).sum();

    PricedCart {
        lines,
        subtotal,
        item_count,
    }
}

/// Plain-text summary used for rental request messages.
#[must_use]
pub fn summary_text(priced: &PricedCart) -> String {
    let mut text = String::from("Rental request:\n");
    for line in &priced.lines {
        text.push_str(&format!(
            "- {} x{} for {} day(s): {}\n",
            line.product.name, line.quantity, line.days, line.line_total
        ));
    }
    text.push_str(&format!("Estimated total: {}", priced.subtotal));
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::CategoryId;

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: pid(id),
            name: format!("Product {id}"),
            slug: id.to_string(),
            description: String::new(),
            category_id: CategoryId::new("cameras"),
            brand_id: None,
            price_per_day: Decimal::new(price_cents, 2),
            deposit: None,
            images: Vec::new(),
            specs: Vec::new(),
            in_stock: true,
            featured: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_appends_then_sums() {
        let mut cart = Cart::default();
        cart.add(pid("a"), 1, 2);
        cart.add(pid("b"), 1, 1);
        cart.add(pid("a"), 2, 5);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items()[0].days, 5);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_add_clamps() {
        let mut cart = Cart::default();
        cart.add(pid("a"), 0, 0);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.items()[0].days, 1);

        cart.add(pid("a"), 50, 500);
        assert_eq!(cart.items()[0].quantity, MAX_QUANTITY);
        assert_eq!(cart.items()[0].days, MAX_RENTAL_DAYS);
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = Cart::default();
        cart.add(pid("a"), 1, 1);

        assert!(cart.update(&pid("a"), 4, Some(3)));
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(cart.items()[0].days, 3);

        assert!(!cart.update(&pid("missing"), 1, None));

        assert!(cart.update(&pid("a"), 0, None));
        assert!(cart.is_empty());
        assert!(!cart.remove(&pid("a")));
    }

    #[test]
    fn test_from_items_folds_duplicates() {
        let cart = Cart::from_items(vec![
            CartItem::new(pid("a"), 1, 1),
            CartItem::new(pid("a"), 2, 4),
        ]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_merge_guest_last_write_wins() {
        let account = Cart::from_items(vec![
            CartItem::new(pid("a"), 1, 1),
            CartItem::new(pid("b"), 2, 2),
        ]);
        let guest = Cart::from_items(vec![
            CartItem::new(pid("c"), 1, 3),
            CartItem::new(pid("b"), 5, 7),
        ]);

        let merged = Cart::merge_guest(account, guest);
        let ids: Vec<&str> = merged.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(merged.items()[1].quantity, 5);
        assert_eq!(merged.items()[1].days, 7);
    }

    #[test]
    fn test_merge_guest_with_empty_sides() {
        let guest = Cart::from_items(vec![CartItem::new(pid("a"), 1, 1)]);
        assert_eq!(Cart::merge_guest(Cart::default(), guest.clone()), guest);
        assert_eq!(Cart::merge_guest(guest.clone(), Cart::default()), guest);
    }

    #[test]
    fn test_price_cart_drops_missing_products() {
        let cart = Cart::from_items(vec![
            CartItem::new(pid("a"), 2, 3),
            CartItem::new(pid("gone"), 1, 1),
        ]);
        let priced = price_cart(&cart, &[product("a", 1500)]);

        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.subtotal.display(), "$90.00");
        assert_eq!(priced.item_count, 2);
    }

    #[test]
    fn test_summary_text() {
        let cart = Cart::from_items(vec![CartItem::new(pid("a"), 1, 2)]);
        let priced = price_cart(&cart, &[product("a", 1000)]);
        let text = summary_text(&priced);
        assert!(text.contains("Product a x1 for 2 day(s): $20.00"));
        assert!(text.ends_with("Estimated total: $20.00"));
    }
}
