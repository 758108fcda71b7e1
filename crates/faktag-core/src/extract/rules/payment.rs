//! Payment method extraction.

use crate::models::invoice::PaymentMethod;

use super::patterns::PAYMENT_LABEL;

/// Payment method from an explicit label, else the first vocabulary hit.
pub fn extract_payment_method(text: &str) -> Option<PaymentMethod> {
    PAYMENT_LABEL
        .captures_iter(text)
        .find_map(|caps| PaymentMethod::from_str(&caps[1]))
        .or_else(|| PaymentMethod::from_str(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_wins_over_vocabulary() {
        let text = "Płatne kartą przy odbiorze?\nSposób płatności: przelew\n";
        assert_eq!(extract_payment_method(text), Some(PaymentMethod::Transfer));
    }

    #[test]
    fn test_vocabulary_fallback() {
        assert_eq!(
            extract_payment_method("Zapłacono gotówką"),
            Some(PaymentMethod::Cash)
        );
        assert_eq!(
            extract_payment_method("Forma płatności: BLIK"),
            Some(PaymentMethod::Blik)
        );
        assert_eq!(
            extract_payment_method("Opłata: przekaz pocztowy"),
            Some(PaymentMethod::PostalTransfer)
        );
        assert_eq!(extract_payment_method("Razem do zapłaty 100,00"), None);
    }
}
