use crate::domain::order::OrderNumber;
use super::errors::SubmissionError;

pub fn order_placed(order_number: OrderNumber) -> String {
    format!("Your order {} has been placed", order_number)
}

/// Failure text quoting the reason, plus a charge warning once funds were captured
pub fn order_failed(order_number: OrderNumber, error: &SubmissionError, funds_captured: bool) -> String {
    let mut message = format!(
        "There was an error in processing your order {}: {}. Please contact Video Store",
        order_number, error
    );
    if funds_captured {
        message.push_str(". Your account may already have been charged for this order");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountNumber;

    #[test]
    fn test_order_placed() {
        let order_number = OrderNumber::generate();
        assert_eq!(
            order_placed(order_number),
            format!("Your order {} has been placed", order_number)
        );
    }

    #[test]
    fn test_order_failed_quotes_reason() {
        let order_number = OrderNumber::generate();
        let message = order_failed(
            order_number,
            &SubmissionError::InsufficientFunds(AccountNumber(456)),
            false,
        );

        assert!(message.contains(&order_number.to_string()));
        assert!(message.contains("insufficient funds in account 456"));
        assert!(!message.contains("charged"));
    }

    #[test]
    fn test_order_failed_mentions_charge() {
        let message = order_failed(
            OrderNumber::generate(),
            &SubmissionError::DeliveryUnavailable("timeout".into()),
            true,
        );
        assert!(message.ends_with("may already have been charged for this order"));
    }
}
