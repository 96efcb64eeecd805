//! Cart line arithmetic.
//!
//! A cart is just "all lines for user X"; totals are always derived from the
//! live lines, never stored.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One product-quantity pairing pending purchase for a user.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl CartLine {
    pub fn new(id: Uuid, product_id: Uuid, name: String, quantity: i32, unit_price: Decimal) -> Self {
        let total = line_total(unit_price, quantity);
        Self { id, product_id, name, quantity, unit_price, total }
    }
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().fold(Decimal::ZERO, |acc, l| acc + l.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(name: &str, quantity: i32, unit_price: Decimal) -> CartLine {
        CartLine::new(Uuid::new_v4(), Uuid::new_v4(), name.into(), quantity, unit_price)
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        let l = line("Pan de Masa Madre", 1, dec!(3.50));
        assert_eq!(l.total, dec!(3.50));
        let l = line("Croissant", 3, dec!(1.25));
        assert_eq!(l.total, dec!(3.75));
    }

    #[test]
    fn cart_total_sums_all_lines() {
        let lines = vec![
            line("Pan de Masa Madre", 2, dec!(3.50)),
            line("Croissant", 1, dec!(1.25)),
        ];
        assert_eq!(cart_total(&lines), dec!(8.25));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
