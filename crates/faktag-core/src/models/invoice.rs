//! Invoice field and output record models.

use serde::{Deserialize, Serialize};

/// Placeholder for a vendor or buyer name no rule could find.
pub const NAME_NOT_FOUND: &str = "Nie znaleziono";

/// Placeholder for a buyer NIP no rule could find.
pub const NIP_UNKNOWN: &str = "Brak";

/// Placeholder for an invoice number no rule could find.
pub const NUMBER_UNKNOWN: &str = "Nieznany";

/// Fields extracted from the text of a single invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFields {
    /// Seller (sprzedawca) name.
    pub vendor_name: String,

    /// Seller NIP, exactly 10 digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_nip: Option<String>,

    /// Buyer (nabywca) name.
    pub buyer_name: String,

    /// Buyer NIP, 10 digits or [`NIP_UNKNOWN`].
    pub buyer_nip: String,

    /// Buyer address lines following the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_address: Option<String>,

    /// Invoice number as printed.
    pub invoice_number: String,

    /// Issue date (data wystawienia), `DD.MM.YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,

    /// Payment due date (termin płatności), `DD.MM.YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// Payment method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl Default for InvoiceFields {
    fn default() -> Self {
        Self {
            vendor_name: NAME_NOT_FOUND.to_string(),
            vendor_nip: None,
            buyer_name: NAME_NOT_FOUND.to_string(),
            buyer_nip: NIP_UNKNOWN.to_string(),
            buyer_address: None,
            invoice_number: NUMBER_UNKNOWN.to_string(),
            issue_date: None,
            due_date: None,
            payment_method: None,
        }
    }
}

impl InvoiceFields {
    /// Whether the buyer NIP is a real 10-digit value.
    pub fn has_buyer_nip(&self) -> bool {
        self.buyer_nip != NIP_UNKNOWN
    }

    /// Names of fields that fell back to their sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vendor_name == NAME_NOT_FOUND {
            missing.push("vendor_name");
        }
        if self.vendor_nip.is_none() {
            missing.push("vendor_nip");
        }
        if self.buyer_name == NAME_NOT_FOUND {
            missing.push("buyer_name");
        }
        if !self.has_buyer_nip() {
            missing.push("buyer_nip");
        }
        if self.invoice_number == NUMBER_UNKNOWN {
            missing.push("invoice_number");
        }
        if self.issue_date.is_none() {
            missing.push("issue_date");
        }
        missing
    }
}

/// Payment method vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Bank transfer (przelew).
    #[serde(rename = "Przelew")]
    Transfer,
    /// Cash (gotówka).
    #[serde(rename = "Gotówka")]
    Cash,
    /// Payment card (karta).
    #[serde(rename = "Karta")]
    Card,
    /// BLIK mobile payment.
    #[serde(rename = "BLIK")]
    Blik,
    /// PayPal.
    #[serde(rename = "PayPal")]
    PayPal,
    /// Postal transfer (przekaz pocztowy).
    #[serde(rename = "Przekaz pocztowy")]
    PostalTransfer,
}

impl PaymentMethod {
    /// Keyword order used when no explicit label is present.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Transfer,
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Blik,
        PaymentMethod::PayPal,
        PaymentMethod::PostalTransfer,
    ];

    /// Lowercase keywords that identify this method.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            PaymentMethod::Transfer => &["przelew", "transfer"],
            PaymentMethod::Cash => &["gotówka", "gotówką", "gotowka", "cash"],
            PaymentMethod::Card => &["karta", "kartą", "card"],
            PaymentMethod::Blik => &["blik"],
            PaymentMethod::PayPal => &["paypal"],
            PaymentMethod::PostalTransfer => &["przekaz pocztowy", "postal order"],
        }
    }

    /// Parse a payment method from a free-form label value or text.
    ///
    /// Postal transfers are checked first so "przekaz pocztowy" is never
    /// read as a bank transfer; the rest follow [`PaymentMethod::ALL`].
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return None;
        }

        if PaymentMethod::PostalTransfer.keywords().iter().any(|k| s.contains(k)) {
            return Some(PaymentMethod::PostalTransfer);
        }

        PaymentMethod::ALL
            .iter()
            .copied()
            .find(|m| m.keywords().iter().any(|k| s.contains(k)))
    }

    /// Polish display label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Transfer => "Przelew",
            PaymentMethod::Cash => "Gotówka",
            PaymentMethod::Card => "Karta",
            PaymentMethod::Blik => "BLIK",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::PostalTransfer => "Przekaz pocztowy",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// MPK and group codes assigned to a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCodes {
    /// Cost center code, e.g. `MPK710`.
    pub mpk: String,
    /// Group code, e.g. `7/2`.
    pub group: String,
    /// Human readable category description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CategoryCodes {
    pub fn new(mpk: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            mpk: mpk.into(),
            group: group.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A fully processed invoice, ready to be persisted or exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub vendor_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_nip: Option<String>,

    pub buyer_name: String,

    pub buyer_nip: String,

    /// Optional client number appended to the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_number: Option<String>,

    pub invoice_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    pub mpk: String,

    pub group: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Allocated counter value. Immutable once assigned.
    pub sequence: u32,

    /// Counter year the sequence belongs to.
    pub year: i32,

    /// Formatted sequential number, e.g. `007/2025` or `KJ_A_0007`.
    pub sequential_number: String,

    /// `group;mpk;sequentialNumber[;clientNumber]`.
    pub label: String,

    /// Epoch milliseconds.
    pub processed_at: i64,

    /// Epoch milliseconds of the last edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl InvoiceRecord {
    /// The record's category codes.
    pub fn codes(&self) -> CategoryCodes {
        CategoryCodes {
            mpk: self.mpk.clone(),
            group: self.group.clone(),
            category: self.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!(PaymentMethod::from_str("przelew bankowy"), Some(PaymentMethod::Transfer));
        assert_eq!(PaymentMethod::from_str("Gotówka"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::from_str("karta płatnicza"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::from_str("BLIK"), Some(PaymentMethod::Blik));
        assert_eq!(PaymentMethod::from_str("przekaz pocztowy"), Some(PaymentMethod::PostalTransfer));
        assert_eq!(PaymentMethod::from_str("kompensata"), None);
    }

    #[test]
    fn test_default_fields_use_sentinels() {
        let fields = InvoiceFields::default();
        assert_eq!(fields.vendor_name, NAME_NOT_FOUND);
        assert_eq!(fields.buyer_nip, NIP_UNKNOWN);
        assert!(!fields.has_buyer_nip());
        assert!(fields.missing_fields().contains(&"invoice_number"));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = InvoiceRecord {
            vendor_name: "Acme".to_string(),
            vendor_nip: None,
            buyer_name: "Foo".to_string(),
            buyer_nip: "0987654321".to_string(),
            client_number: None,
            invoice_number: "1/2025".to_string(),
            issue_date: None,
            due_date: None,
            payment_method: Some(PaymentMethod::Transfer),
            mpk: "MPK100".to_string(),
            group: "1/1".to_string(),
            category: None,
            sequence: 1,
            year: 2025,
            sequential_number: "001/2025".to_string(),
            label: "1/1;MPK100;001/2025".to_string(),
            processed_at: 0,
            last_modified: None,
            file_name: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sequentialNumber"], "001/2025");
        assert_eq!(json["paymentMethod"], "Przelew");
        assert!(json.get("vendorNip").is_none());
    }
}
