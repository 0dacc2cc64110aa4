//! Storefront state shared by every front end.
//!
//! [`Storefront`] wires the stores, the session and the API client onto one
//! storage backend and exposes the flows that span more than one of them.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{Email, ProductId, ProductRef, UserKey};
use tracing::instrument;

use crate::api::{ApiClient, Product, RegisteredUser};
use crate::basket::BasketStore;
use crate::catalog::{filter_products, find_product};
use crate::checkout::{Checkout, CheckoutForm, OrderConfirmation};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::favorites::FavoritesStore;
use crate::identity::IdentityResolver;
use crate::session::AuthSession;
use crate::storage::{FileStorage, Storage};

/// Baskets, favorites, session and catalog for one storage backend.
#[derive(Debug)]
pub struct Storefront {
    identity: IdentityResolver,
    basket: BasketStore,
    favorites: FavoritesStore,
    session: AuthSession,
    api: ApiClient,
    checkout: Checkout,
}

impl Storefront {
    /// Open the storefront with file-backed state under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: &StorefrontConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        let api = ApiClient::new(&config.api)?;
        tracing::debug!(data_dir = %config.data_dir.display(), "Opening storefront");
        Ok(Self::new(storage, api, config.checkout_delay))
    }

    /// Restore every store from `storage`.
    ///
    /// The stores follow this storefront's session user even when the
    /// session record cannot be written.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, api: ApiClient, checkout_delay: Duration) -> Self {
        let identity = IdentityResolver::new(Arc::clone(&storage));
        let mut session = AuthSession::with_identity(Arc::clone(&storage), identity.clone());
        session.restore();

        Self {
            basket: BasketStore::with_identity(Arc::clone(&storage), identity.clone()),
            favorites: FavoritesStore::with_identity(storage, identity.clone()),
            identity,
            session,
            api,
            checkout: Checkout::new(checkout_delay),
        }
    }

    /// The user key that `explicit` resolves to.
    #[must_use]
    pub fn current_user(&self, explicit: Option<&str>) -> UserKey {
        self.identity.resolve(explicit)
    }

    #[must_use]
    pub const fn basket(&self) -> &BasketStore {
        &self.basket
    }

    pub const fn basket_mut(&mut self) -> &mut BasketStore {
        &mut self.basket
    }

    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub const fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    #[must_use]
    pub const fn session(&self) -> &AuthSession {
        &self.session
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Catalog products matching `query`; a blank query lists everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let products = self.api.list_products().await?;
        Ok(filter_products(&products, query).into_iter().cloned().collect())
    }

    async fn product_ref(&self, id: &ProductId) -> Result<ProductRef> {
        let products = self.api.list_products().await?;
        find_product(&products, id)
            .map(ProductRef::from)
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))
    }

    /// Add one unit of catalog product `id` to the basket.
    ///
    /// Returns the new quantity of that line.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the catalog has no such product.
    pub async fn add_to_basket(&mut self, id: &ProductId, user: Option<&str>) -> Result<u32> {
        let product = self.product_ref(id).await?;
        self.basket.add_item(product, user);
        Ok(self.basket.quantity_of(id, user))
    }

    /// Flip catalog product `id` in or out of the favorites list.
    ///
    /// Returns `true` if it is now a favorite. Removing an entry does not
    /// consult the catalog, so delisted products can still be unfavorited.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when adding a product the catalog lacks.
    pub async fn toggle_favorite(&mut self, id: &ProductId, user: Option<&str>) -> Result<bool> {
        if self.favorites.is_favorite(id, user) {
            return Ok(self.favorites.toggle(ProductRef::new(id.clone(), ""), user));
        }
        let product = self.product_ref(id).await?;
        Ok(self.favorites.toggle(product, user))
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Log in and record the session. The username doubles as the user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the credentials. The previous
    /// session is kept on failure.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<()> {
        let token = self.api.login(username, password).await?;
        self.session.set_auth(token, username, Some(username));
        Ok(())
    }

    /// Create an account. Does not log in.
    ///
    /// Every field must be non-blank, and `confirm_password`, when given,
    /// must match `password`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the passwords differ, the email
    /// is malformed, or the API rejects the account.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &SecretString,
        confirm_password: Option<&SecretString>,
    ) -> Result<RegisteredUser> {
        if email.trim().is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if username.trim().is_empty() {
            return Err(AppError::MissingField("username"));
        }
        if password.expose_secret().is_empty() {
            return Err(AppError::MissingField("password"));
        }
        if confirm_password.is_some_and(|c| c.expose_secret() != password.expose_secret()) {
            return Err(AppError::PasswordMismatch);
        }

        let email = Email::parse(email)?;
        let user = self.api.register(&email, username.trim(), password).await?;
        tracing::info!(username, id = %user.id, "Account registered");
        Ok(user)
    }

    /// Clear the session. Baskets and favorites are kept.
    pub fn logout(&mut self) {
        self.session.clear_auth();
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place an order for the resolved user's basket.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Checkout`] if the session is anonymous, the basket
    /// is empty or the form is incomplete.
    pub async fn checkout(
        &mut self,
        form: &CheckoutForm,
        user: Option<&str>,
    ) -> Result<OrderConfirmation> {
        let user = self.current_user(user);
        Ok(self
            .checkout
            .submit(&mut self.basket, &self.session, form, &user)
            .await?)
    }
}
