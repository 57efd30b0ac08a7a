//! Order totals.

use common::Money;
use orders::NewOrderLine;

/// Tax rate applied to every order subtotal, in percent.
pub const TAX_RATE_PERCENT: i64 = 10;

/// Subtotal, tax and total of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Prices a set of line items using their own unit prices.
    ///
    /// Returns `None` if any line total or the order total would exceed
    /// [`Money::MAX`].
    pub fn from_lines(lines: &[NewOrderLine]) -> Option<Self> {
        let mut subtotal = Money::zero();
        for line in lines {
            let line_total = line
                .price
                .checked_multiply(line.quantity)
                .filter(Money::is_within_limit)?;
            subtotal = subtotal.checked_add(line_total)?;
        }
        let tax = subtotal.percent(TAX_RATE_PERCENT);
        let total = subtotal.checked_add(tax).filter(Money::is_within_limit)?;
        Some(Self {
            subtotal,
            tax,
            total,
        })
    }
}
