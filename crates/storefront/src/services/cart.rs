//! Cart storage.
//!
//! Visitors who are not signed in keep their cart in the session under
//! `guest_cart`. Signed-in customers keep it in `users/{uid}.cart`. On sign-in
//! the guest cart is merged into the account cart and cleared.

use std::sync::Arc;

use camrent_core::cart::{Cart, PricedCart, price_cart};
use camrent_core::UserId;
use camrent_firebase::Datastore;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::users;
use crate::catalog::CatalogClient;
use crate::error::Result;
use crate::models::{CurrentCustomer, session_keys};

/// Where a cart lives.
#[derive(Debug, Clone, Copy)]
pub enum CartOwner<'a> {
    Guest,
    Account(&'a UserId),
}

impl<'a> CartOwner<'a> {
    #[must_use]
    pub fn of(customer: Option<&'a CurrentCustomer>) -> Self {
        customer.map_or(Self::Guest, |c| Self::Account(&c.uid))
    }
}

async fn guest_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::GUEST_CART)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session or the user document cannot be read.
pub async fn load(db: &Arc<dyn Datastore>, session: &Session, owner: CartOwner<'_>) -> Result<Cart> {
    match owner {
        CartOwner::Guest => guest_cart(session).await,
        CartOwner::Account(uid) => Ok(users::load_profile(db, uid)
            .await?
            .map(|profile| Cart::from_items(profile.cart))
            .unwrap_or_default()),
    }
}

/// # Errors
///
/// Returns an error if the session or the user document cannot be written.
pub async fn save(
    db: &Arc<dyn Datastore>,
    session: &Session,
    owner: CartOwner<'_>,
    cart: &Cart,
) -> Result<()> {
    match owner {
        CartOwner::Guest => session.insert(session_keys::GUEST_CART, cart).await?,
        CartOwner::Account(uid) => users::save_cart(db, uid, cart.items()).await?,
    }
    Ok(())
}

/// Fold the session's guest cart into the account cart.
///
/// Returns the merged cart. Nothing is written when the guest cart is empty.
///
/// # Errors
///
/// Returns an error if either cart cannot be read or the merge cannot be
/// written. The guest cart is only cleared after the account write succeeds.
#[instrument(skip(db, session))]
pub async fn merge_guest_into_account(
    db: &Arc<dyn Datastore>,
    session: &Session,
    uid: &UserId,
) -> Result<Cart> {
    let guest = guest_cart(session).await?;
    let account = load(db, session, CartOwner::Account(uid)).await?;
    if guest.is_empty() {
        return Ok(account);
    }

    let guest_lines = guest.items().len();
    let merged = Cart::merge_guest(account, guest);
    users::save_cart(db, uid, merged.items()).await?;
    session.remove::<Cart>(session_keys::GUEST_CART).await?;

    info!(guest_lines, total_lines = merged.items().len(), "Merged guest cart");
    Ok(merged)
}

/// Price a cart against the cached catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub async fn priced(catalog: &CatalogClient, cart: &Cart) -> Result<PricedCart> {
    let products = catalog.products().await?;
    Ok(price_cart(cart, &products))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use camrent_core::ProductId;
    use camrent_firebase::MemoryDatastore;
    use tower_sessions::MemoryStore;

    use super::*;

    fn setup() -> (Arc<dyn Datastore>, Session) {
        (
            Arc::new(MemoryDatastore::new()),
            Session::new(None, Arc::new(MemoryStore::default()), None),
        )
    }

    #[tokio::test]
    async fn test_guest_cart_lives_in_session() {
        let (db, session) = setup();
        let mut cart = load(&db, &session, CartOwner::Guest).await.unwrap();
        cart.add(ProductId::new("p1"), 1, 2);
        save(&db, &session, CartOwner::Guest, &cart).await.unwrap();

        let reloaded = load(&db, &session, CartOwner::Guest).await.unwrap();
        assert_eq!(reloaded.item_count(), 1);
    }

    #[tokio::test]
    async fn test_merge_on_sign_in() {
        let (db, session) = setup();
        let uid = UserId::new("u1");

        let mut account = Cart::default();
        account.add(ProductId::new("p1"), 1, 1);
        account.add(ProductId::new("p2"), 1, 1);
        save(&db, &session, CartOwner::Account(&uid), &account).await.unwrap();

        let mut guest = Cart::default();
        guest.add(ProductId::new("p2"), 3, 5);
        guest.add(ProductId::new("p3"), 1, 2);
        save(&db, &session, CartOwner::Guest, &guest).await.unwrap();

        let merged = merge_guest_into_account(&db, &session, &uid).await.unwrap();
        let ids: Vec<&str> = merged.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(merged.items()[1].quantity, 3);
        assert_eq!(merged.items()[1].days, 5);

        let stored = load(&db, &session, CartOwner::Account(&uid)).await.unwrap();
        assert_eq!(stored, merged);
        assert!(load(&db, &session, CartOwner::Guest).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_guest_cart_writes_nothing() {
        let (db, session) = setup();
        let uid = UserId::new("u1");
        let merged = merge_guest_into_account(&db, &session, &uid).await.unwrap();
        assert!(merged.is_empty());
        assert!(users::load_profile(&db, &uid).await.unwrap().is_none());
    }
}
