//! Payment methods and the pure part of settlement.
//!
//! Settlement itself runs inside a database transaction (see
//! `routes::payments`); everything that can be decided without the store —
//! method parsing, emptiness, sufficiency, change — lives here so it can be
//! tested exhaustively.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::{cart_total, CartLine};
use crate::error::ApiError;

/// Accepted payment channels. Everything except `Cash` is settled by an
/// external gateway treated as a trusted collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Visa,
    Ach,
    Yappy,
}

impl PaymentMethod {
    /// Parses a wire value. `efectivo` is the legacy alias for cash and is
    /// normalized on input; storage and responses always say `cash`.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "visa" => Ok(PaymentMethod::Visa),
            "ach" => Ok(PaymentMethod::Ach),
            "yappy" => Ok(PaymentMethod::Yappy),
            _ => Err(ApiError::InvalidInput("invalid payment method".into())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Visa => "visa",
            PaymentMethod::Ach => "ach",
            PaymentMethod::Yappy => "yappy",
        }
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

/// The validated outcome of a settlement attempt, before anything is
/// persisted. Building a plan mutates nothing; a failed plan leaves cart and
/// stock exactly as they were.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementPlan {
    pub method: PaymentMethod,
    pub total: Decimal,
    pub amount_received: Option<Decimal>,
    pub change: Option<Decimal>,
}

/// Plans a cash settlement: rejects empty carts and insufficient tender,
/// otherwise fixes total and exact change.
pub fn plan_cash(lines: &[CartLine], amount_received: Decimal) -> Result<SettlementPlan, ApiError> {
    if lines.is_empty() {
        return Err(ApiError::EmptyCart);
    }
    let total = cart_total(lines);
    if amount_received < total {
        return Err(ApiError::InsufficientPayment);
    }
    Ok(SettlementPlan {
        method: PaymentMethod::Cash,
        total,
        amount_received: Some(amount_received),
        change: Some(amount_received - total),
    })
}

/// Plans a digital settlement. The cart must be non-empty even though the
/// gateway is assumed to succeed; selection and settlement are separate
/// calls and the cart may have changed in between.
pub fn plan_digital(lines: &[CartLine], method: PaymentMethod) -> Result<SettlementPlan, ApiError> {
    if method.is_cash() {
        return Err(ApiError::InvalidInput(
            "cash settlement requires an amount received".into(),
        ));
    }
    if lines.is_empty() {
        return Err(ApiError::EmptyCart);
    }
    Ok(SettlementPlan {
        method,
        total: cart_total(lines),
        amount_received: None,
        change: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartLine;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn line(quantity: i32, unit_price: Decimal) -> CartLine {
        CartLine::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Pan de Masa Madre".into(),
            quantity,
            unit_price,
        )
    }

    #[test]
    fn parse_accepts_known_methods_and_the_cash_alias() {
        assert_eq!(PaymentMethod::parse("cash").unwrap(), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::parse("efectivo").unwrap(), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::parse("VISA").unwrap(), PaymentMethod::Visa);
        assert_eq!(PaymentMethod::parse("ach").unwrap(), PaymentMethod::Ach);
        assert_eq!(PaymentMethod::parse("yappy").unwrap(), PaymentMethod::Yappy);
    }

    #[test]
    fn parse_rejects_unknown_methods() {
        for raw in ["", "bitcoin", "cheque", "paypal"] {
            assert!(matches!(
                PaymentMethod::parse(raw),
                Err(ApiError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn cash_succeeds_iff_amount_covers_total() {
        let lines = vec![line(1, dec!(4.00))];

        let plan = plan_cash(&lines, dec!(4.00)).unwrap();
        assert_eq!(plan.total, dec!(4.00));
        assert_eq!(plan.change, Some(dec!(0.00)));

        assert!(matches!(
            plan_cash(&lines, dec!(3.00)),
            Err(ApiError::InsufficientPayment)
        ));
    }

    #[test]
    fn cash_change_is_exact() {
        let lines = vec![line(1, dec!(3.50))];
        let plan = plan_cash(&lines, dec!(4.00)).unwrap();
        assert_eq!(plan.total, dec!(3.50));
        assert_eq!(plan.amount_received, Some(dec!(4.00)));
        assert_eq!(plan.change, Some(dec!(0.50)));
    }

    #[test]
    fn empty_cart_is_rejected_by_both_paths() {
        assert!(matches!(plan_cash(&[], dec!(100)), Err(ApiError::EmptyCart)));
        assert!(matches!(
            plan_digital(&[], PaymentMethod::Visa),
            Err(ApiError::EmptyCart)
        ));
    }

    #[test]
    fn digital_refuses_the_cash_method() {
        let lines = vec![line(1, dec!(2.00))];
        assert!(matches!(
            plan_digital(&lines, PaymentMethod::Cash),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn digital_carries_no_tender_fields() {
        let lines = vec![line(2, dec!(2.25))];
        let plan = plan_digital(&lines, PaymentMethod::Yappy).unwrap();
        assert_eq!(plan.total, dec!(4.50));
        assert_eq!(plan.amount_received, None);
        assert_eq!(plan.change, None);
    }
}
