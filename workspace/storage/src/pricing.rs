//! Checkout arithmetic.
//!
//! Prices are captured once, when the order is placed. Nothing here reads
//! the database; [`crate::orders`] loads books and zones and hands them in.

use model::entities::wilaya;
use rust_decimal::Decimal;

use crate::error::{Result, StorageError};

/// Largest amount a `decimal(12,2)` money column holds: 9 999 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Whether a price or fee is storable: not negative and within [`MAX_AMOUNT`].
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= MAX_AMOUNT
}

/// An order line with its unit price fixed at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub book_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    /// `None` when the product overflows.
    pub fn total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of every line total, `None` on overflow.
pub fn subtotal(lines: &[PricedLine]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.total()?))
}

/// Shipping fee for the chosen zone: its price when it exists and is
/// active, zero otherwise.
pub fn shipping_fee(zone: Option<&wilaya::Model>) -> Decimal {
    match zone {
        Some(zone) if zone.is_active => zone.shipping_price,
        _ => Decimal::ZERO,
    }
}

/// Fully priced checkout, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl Quote {
    /// Fails with [`StorageError::Invalid`] when the total does not fit a
    /// money column.
    pub fn new(lines: Vec<PricedLine>, shipping: Decimal) -> Result<Self> {
        let subtotal = subtotal(&lines);
        let total = subtotal
            .and_then(|subtotal| subtotal.checked_add(shipping))
            .filter(|total| *total <= MAX_AMOUNT);
        match (subtotal, total) {
            (Some(subtotal), Some(total)) => Ok(Self {
                lines,
                subtotal,
                shipping,
                total,
            }),
            _ => Err(StorageError::Invalid(format!(
                "Order total exceeds the maximum of {MAX_AMOUNT} DZD"
            ))),
        }
    }
}
