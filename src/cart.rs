//! Cart
//!
//! A local snapshot of the line items held by the remote cart store. Every
//! mutation returns a new list; inputs are never modified in place.

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    items::{LineItem, ProductId},
    pricing::{PricingError, zero},
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),
}

/// Calculates the sum of `unit_price × quantity` across all items.
///
/// An empty list yields zero in `currency`.
///
/// # Errors
///
/// - [`PricingError::Money`]: an item is priced in a different currency.
/// - [`PricingError::Overflow`]: the sum does not fit in minor units.
pub fn compute_subtotal<'a>(
    items: &[LineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    items.iter().try_fold(zero(currency), |acc, item| {
        Ok(acc.add(item.line_total()?)?)
    })
}

/// Returns a new list with the quantity of `product_id` replaced.
///
/// A quantity below one removes the item. Unknown products leave the list unchanged.
pub fn change_quantity<'a>(
    items: &[LineItem<'a>],
    product_id: &ProductId,
    new_quantity: u32,
) -> Vec<LineItem<'a>> {
    let Some(quantity) = NonZeroU32::new(new_quantity) else {
        return remove_item(items, product_id);
    };

    items
        .iter()
        .map(|item| {
            if item.product_id() == product_id {
                item.with_quantity(quantity)
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Returns a new list without `product_id`. Unknown products leave the list unchanged.
pub fn remove_item<'a>(items: &[LineItem<'a>], product_id: &ProductId) -> Vec<LineItem<'a>> {
    items
        .iter()
        .filter(|item| item.product_id() != product_id)
        .cloned()
        .collect()
}

/// Returns a new list with `item` added.
///
/// Adding a product already in the list merges the quantities and takes the
/// newer unit price.
pub fn add_item<'a>(items: &[LineItem<'a>], item: LineItem<'a>) -> Vec<LineItem<'a>> {
    let mut merged = false;

    let mut next: Vec<LineItem<'a>> = items
        .iter()
        .map(|existing| {
            if !merged && existing.product_id() == item.product_id() {
                merged = true;
                item.with_quantity(existing.quantity().saturating_add(item.quantity().get()))
            } else {
                existing.clone()
            }
        })
        .collect();

    if !merged {
        next.push(item);
    }

    next
}

/// Adds one to the quantity of `product_id`.
pub fn increment_quantity<'a>(items: &[LineItem<'a>], product_id: &ProductId) -> Vec<LineItem<'a>> {
    step_quantity(items, product_id, |quantity| quantity.saturating_add(1))
}

/// Subtracts one from the quantity of `product_id`, removing it when it reaches zero.
pub fn decrement_quantity<'a>(items: &[LineItem<'a>], product_id: &ProductId) -> Vec<LineItem<'a>> {
    step_quantity(items, product_id, |quantity| quantity.saturating_sub(1))
}

fn step_quantity<'a>(
    items: &[LineItem<'a>],
    product_id: &ProductId,
    step: impl Fn(u32) -> u32,
) -> Vec<LineItem<'a>> {
    match items.iter().find(|item| item.product_id() == product_id) {
        Some(item) => change_quantity(items, product_id, step(item.quantity().get())),
        None => items.to_vec(),
    }
}

/// Cart
#[derive(Clone, Debug, PartialEq)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    currency: &'a Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    pub fn new(currency: &'a Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_items(
        items: impl Into<Vec<LineItem<'a>>>,
        currency: &'a Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.currency();
            if item_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { items, currency })
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `PricingError` if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        compute_subtotal(&self.items, self.currency)
    }

    /// Returns a cart with the quantity of `product_id` replaced, or the item removed below one.
    #[must_use]
    pub fn with_quantity(&self, product_id: &ProductId, quantity: u32) -> Self {
        self.replace_items(change_quantity(&self.items, product_id, quantity))
    }

    /// Returns a cart without `product_id`.
    #[must_use]
    pub fn without_item(&self, product_id: &ProductId) -> Self {
        self.replace_items(remove_item(&self.items, product_id))
    }

    /// Returns a cart with `item` added or merged into an existing line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the item is priced in another currency.
    pub fn with_item(&self, item: LineItem<'a>) -> Result<Self, CartError> {
        if item.currency() != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.items.len(),
                item.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        Ok(self.replace_items(add_item(&self.items, item)))
    }

    /// Returns a cart with one more of `product_id`.
    #[must_use]
    pub fn incremented(&self, product_id: &ProductId) -> Self {
        self.replace_items(increment_quantity(&self.items, product_id))
    }

    /// Returns a cart with one fewer of `product_id`.
    #[must_use]
    pub fn decremented(&self, product_id: &ProductId) -> Self {
        self.replace_items(decrement_quantity(&self.items, product_id))
    }

    /// Returns an empty cart in the same currency.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Cart::new(self.currency)
    }

    /// Find the line for `product_id`.
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem<'a>> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    /// Get the line items.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Iterate over the line items.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem<'a>> {
        self.items.iter()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity().get()))
            .sum()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    fn replace_items(&self, items: Vec<LineItem<'a>>) -> Self {
        Cart {
            items,
            currency: self.currency,
        }
    }
}

impl<'a, 'c> IntoIterator for &'c Cart<'a> {
    type Item = &'c LineItem<'a>;
    type IntoIter = std::slice::Iter<'c, LineItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
