//! End-to-end invoice processing.
//!
//! Text is normalized and parsed, the buyer is verified, the vendor is
//! resolved to codes (stored mapping, override or keyword score) and a
//! sequential label is allocated. Low-confidence classifications are handed
//! back to the caller as [`ProcessingOutcome::NeedsClassification`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{CategoryMatch, Classifier};
use crate::error::Result;
use crate::extract::FieldParser;
use crate::models::config::FaktagConfig;
use crate::models::document::RawDocument;
use crate::models::invoice::{CategoryCodes, InvoiceFields, InvoiceRecord, PaymentMethod, NAME_NOT_FOUND};
use crate::normalize::TextNormalizer;
use crate::ocr::OcrService;
use crate::sequence::{current_year, LabelFormatter, SequenceAssigner};
use crate::store::{
    buyer_key, now_millis, vendor_key, BuyerMapping, BuyerStore, CounterStore, VendorMapping,
    VendorStore,
};
use crate::verify::{IdentityVerifier, VerificationResult};

/// An invoice waiting for the user to choose its codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInvoice {
    pub fields: InvoiceFields,
    pub text: String,
    /// Best automatic guess, possibly not detected at all.
    pub suggestion: CategoryMatch,
    pub verification: VerificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Result of processing one document.
#[derive(Debug, Clone)]
pub enum ProcessingOutcome {
    Completed(InvoiceRecord),
    NeedsClassification(PendingInvoice),
}

impl ProcessingOutcome {
    pub fn record(&self) -> Option<&InvoiceRecord> {
        match self {
            ProcessingOutcome::Completed(record) => Some(record),
            ProcessingOutcome::NeedsClassification(_) => None,
        }
    }
}

/// User changes to a processed record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceEdit {
    pub vendor_name: Option<String>,
    pub vendor_nip: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_nip: Option<String>,
    pub client_number: Option<String>,
    pub invoice_number: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub mpk: Option<String>,
    pub group: Option<String>,
    pub category: Option<String>,
}

/// The processing pipeline with its stores.
pub struct InvoicePipeline {
    normalizer: TextNormalizer,
    parser: FieldParser,
    verifier: IdentityVerifier,
    classifier: Classifier,
    labels: LabelFormatter,
    sequence: SequenceAssigner,
    vendors: Arc<dyn VendorStore>,
    buyers: Arc<dyn BuyerStore>,
}

impl InvoicePipeline {
    pub fn new(
        config: &FaktagConfig,
        vendors: Arc<dyn VendorStore>,
        buyers: Arc<dyn BuyerStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(config),
            parser: FieldParser::from_config(&config.extraction),
            verifier: IdentityVerifier::new(&config.verification),
            classifier: Classifier::new(&config.classification),
            labels: LabelFormatter::new(),
            sequence: SequenceAssigner::new(counters, &config.sequence),
            vendors,
            buyers,
        }
    }

    /// Pipeline over one store holding all three kinds of records.
    pub fn with_store<S>(config: &FaktagConfig, store: Arc<S>) -> Self
    where
        S: VendorStore + BuyerStore + CounterStore + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store)
    }

    pub fn with_ocr(mut self, service: Arc<dyn OcrService>) -> Self {
        self.normalizer = self.normalizer.with_ocr(service);
        self
    }

    pub fn with_verifier(mut self, verifier: IdentityVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_labels(mut self, labels: LabelFormatter) -> Self {
        self.labels = labels;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn sequence(&self) -> &SequenceAssigner {
        &self.sequence
    }

    /// Normalize a document to text and process it.
    pub async fn process(&self, doc: RawDocument) -> Result<ProcessingOutcome> {
        let text = self.normalizer.normalize(&doc).await?;
        debug!("Text source {:?}, confidence {:?}", text.source, text.confidence);
        self.process_text(&text.text, doc.file_name.as_deref()).await
    }

    /// Process already extracted text.
    pub async fn process_text(&self, text: &str, file_name: Option<&str>) -> Result<ProcessingOutcome> {
        let mut fields = self.parser.parse(text).fields;

        self.correct_vendor_name(&mut fields).await?;
        let verification = self.verify_buyer(&mut fields).await?;

        if let Some((key, mapping)) = self.find_vendor_mapping(&fields.vendor_name).await? {
            info!("Using stored codes of vendor {} ({} {})", key, mapping.mpk, mapping.group);
            self.vendors.touch_vendor(&key, now_millis()).await?;
            let codes = CategoryCodes {
                mpk: mapping.mpk,
                group: mapping.group,
                category: mapping.category,
            };
            let record = self.finalize(fields, codes, file_name).await?;
            return Ok(ProcessingOutcome::Completed(record));
        }

        let vendor = known_name(&fields.vendor_name).unwrap_or_default();
        let suggestion = self.classifier.detect(vendor, text);

        if let Some(codes) = suggestion.codes().filter(|_| self.classifier.is_confident(&suggestion)) {
            info!(
                "Auto-assigned {} {} ({:.2}) to {}",
                codes.mpk, codes.group, suggestion.confidence, fields.vendor_name
            );
            self.save_vendor_mapping(&fields.vendor_name, &codes).await?;
            let record = self.finalize(fields, codes, file_name).await?;
            return Ok(ProcessingOutcome::Completed(record));
        }

        info!(
            "Classification of {} needs confirmation (confidence {:.2})",
            fields.vendor_name, suggestion.confidence
        );
        Ok(ProcessingOutcome::NeedsClassification(PendingInvoice {
            fields,
            text: text.to_string(),
            suggestion,
            verification,
            file_name: file_name.map(str::to_string),
        }))
    }

    /// Finish a pending invoice with codes chosen by the user.
    ///
    /// The codes are remembered for the vendor. A manual vendor name also
    /// becomes the confirmed name for the vendor NIP.
    pub async fn complete_manual(
        &self,
        pending: PendingInvoice,
        codes: CategoryCodes,
        manual_vendor_name: Option<String>,
    ) -> Result<InvoiceRecord> {
        let PendingInvoice { mut fields, file_name, .. } = pending;
        let manual = manual_vendor_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if let Some(name) = &manual {
            fields.vendor_name = name.clone();
            if let Some(nip) = &fields.vendor_nip {
                info!("Remembering vendor name {} for NIP {}", name, nip);
                self.vendors.put_vendor_name(nip, name).await?;
            }
        }

        self.save_vendor_mapping(&fields.vendor_name, &codes).await?;
        self.finalize(fields, codes, file_name.as_deref()).await
    }

    /// Apply user edits and regenerate the label.
    ///
    /// The allocated number is kept while the buyer stays the same. Moving
    /// the invoice to another buyer draws a new number from that buyer's
    /// counter, and a remembered buyer's name is filled in unless the edit
    /// names the buyer itself.
    pub async fn apply_edit(&self, mut record: InvoiceRecord, edit: InvoiceEdit) -> Result<InvoiceRecord> {
        let mut renumber = false;
        if let Some(nip) = edit.buyer_nip.filter(|n| *n != record.buyer_nip) {
            if edit.buyer_name.is_none() {
                let buyers = self.buyers.list_buyers().await?;
                if let Some(known) = buyers.into_iter().find(|b| b.nip == nip) {
                    debug!("Buyer name for {} taken from stored mapping", nip);
                    record.buyer_name = known.name;
                }
            }
            record.buyer_nip = nip;
            renumber = true;
        }

        let InvoiceEdit {
            vendor_name,
            vendor_nip,
            buyer_name,
            client_number,
            invoice_number,
            issue_date,
            due_date,
            payment_method,
            mpk,
            group,
            category,
            ..
        } = edit;

        if let Some(v) = vendor_name {
            record.vendor_name = v;
        }
        if let Some(v) = vendor_nip {
            record.vendor_nip = non_empty(v);
        }
        if let Some(v) = buyer_name {
            record.buyer_name = v;
        }
        if let Some(v) = client_number {
            record.client_number = non_empty(v);
        }
        if let Some(v) = invoice_number {
            record.invoice_number = v;
        }
        if let Some(v) = issue_date {
            record.issue_date = non_empty(v);
        }
        if let Some(v) = due_date {
            record.due_date = non_empty(v);
        }
        if let Some(v) = payment_method {
            record.payment_method = Some(v);
        }
        if let Some(v) = mpk {
            record.mpk = v;
        }
        if let Some(v) = group {
            record.group = v;
        }
        if let Some(v) = category {
            record.category = non_empty(v);
        }

        if renumber {
            let year = current_year();
            record.sequence = self.sequence.next_number_in_year(&record.buyer_nip, year).await?;
            record.year = year;
            info!("Invoice {} moved to buyer {} as number {}", record.invoice_number, record.buyer_nip, record.sequence);
        }

        self.labels.relabel(&mut record);
        record.last_modified = Some(now_millis());
        info!("Edited invoice {} -> {}", record.invoice_number, record.label);
        Ok(record)
    }

    /// Attach a client number to a fresh record and rebuild its label.
    pub fn assign_client_number(&self, mut record: InvoiceRecord, client_number: &str) -> InvoiceRecord {
        record.client_number = non_empty(client_number.trim().to_string());
        self.labels.relabel(&mut record);
        record
    }

    /// Remember a confirmed buyer for later verification.
    pub async fn remember_buyer(&self, nip: &str, name: &str, address: &str) -> Result<()> {
        let now = now_millis();
        let mapping = BuyerMapping {
            nip: nip.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            created_at: now,
            last_used: now,
        };
        info!("Saving buyer mapping {} -> {}", name, nip);
        self.buyers.put_buyer(&buyer_key(name), mapping).await?;
        Ok(())
    }

    async fn correct_vendor_name(&self, fields: &mut InvoiceFields) -> Result<()> {
        let Some(nip) = &fields.vendor_nip else {
            return Ok(());
        };

        if let Some(stored) = self.vendors.get_vendor_name(nip).await? {
            if stored != fields.vendor_name {
                info!("Vendor name {} replaced by stored {} (NIP {})", fields.vendor_name, stored, nip);
                fields.vendor_name = stored;
            }
        }
        Ok(())
    }

    async fn verify_buyer(&self, fields: &mut InvoiceFields) -> Result<VerificationResult> {
        let known = self.buyers.list_buyers().await?;
        let result = self.verifier.verify(
            &fields.buyer_name,
            &fields.buyer_nip,
            fields.buyer_address.as_deref(),
            &known,
        );

        if let Some(corrected) = &result.corrected_nip {
            if result.confidence >= self.verifier.threshold() && *corrected != fields.buyer_nip {
                warn!(
                    "Buyer NIP {} corrected to {} (by {:?}, {:.2})",
                    fields.buyer_nip, corrected, result.matched_by, result.confidence
                );
                fields.buyer_nip = corrected.clone();
            }
        }

        Ok(result)
    }

    /// Exact key first, then a key containing or contained in the other.
    async fn find_vendor_mapping(&self, vendor_name: &str) -> Result<Option<(String, VendorMapping)>> {
        let Some(name) = known_name(vendor_name) else {
            return Ok(None);
        };
        let key = vendor_key(name);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(mapping) = self.vendors.get_vendor(&key).await? {
            return Ok(Some((key, mapping)));
        }

        let found = self
            .vendors
            .list_vendors()
            .await?
            .into_iter()
            .find(|(k, _)| !k.is_empty() && (k.contains(&key) || key.contains(k.as_str())));

        if let Some((k, _)) = &found {
            debug!("Vendor {} matched stored key {} by substring", key, k);
        }
        Ok(found)
    }

    async fn save_vendor_mapping(&self, vendor_name: &str, codes: &CategoryCodes) -> Result<()> {
        let Some(name) = known_name(vendor_name) else {
            debug!("Vendor name unknown, codes not remembered");
            return Ok(());
        };
        let key = vendor_key(name);
        if key.is_empty() {
            return Ok(());
        }

        let now = now_millis();
        let created_at = self
            .vendors
            .get_vendor(&key)
            .await?
            .map_or(now, |existing| existing.created_at);

        let mapping = VendorMapping {
            name: name.to_string(),
            mpk: codes.mpk.clone(),
            group: codes.group.clone(),
            category: codes.category.clone(),
            created_at,
            last_used: now,
        };
        self.vendors.put_vendor(&key, mapping).await?;
        Ok(())
    }

    /// Allocate the number and build the record. Runs last so an abandoned
    /// document never consumes a number.
    async fn finalize(
        &self,
        fields: InvoiceFields,
        codes: CategoryCodes,
        file_name: Option<&str>,
    ) -> Result<InvoiceRecord> {
        let year = current_year();
        let sequence = self.sequence.next_number_in_year(&fields.buyer_nip, year).await?;
        let sequential_number =
            self.labels
                .sequential_number(&fields.buyer_nip, &fields.vendor_name, sequence, year);
        let label = self.labels.build(&codes, &sequential_number, None);

        Ok(InvoiceRecord {
            vendor_name: fields.vendor_name,
            vendor_nip: fields.vendor_nip,
            buyer_name: fields.buyer_name,
            buyer_nip: fields.buyer_nip,
            client_number: None,
            invoice_number: fields.invoice_number,
            issue_date: fields.issue_date,
            due_date: fields.due_date,
            payment_method: fields.payment_method,
            mpk: codes.mpk,
            group: codes.group,
            category: codes.category,
            sequence,
            year,
            sequential_number,
            label,
            processed_at: now_millis(),
            last_modified: None,
            file_name: file_name.map(str::to_string),
        })
    }
}

fn known_name(name: &str) -> Option<&str> {
    let name = name.trim();
    (!name.is_empty() && name != NAME_NOT_FOUND).then_some(name)
}

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::MediaType;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    const ORLEN_INVOICE: &str = r#"FAKTURA VAT nr FV/12/2025
Data wystawienia: 2025-03-05
Sprzedawca:
Orlen S.A.
ul. Chemików 7, 09-411 Płock
NIP: 774-00-01-454
Nabywca:
Twój Instalator Piotr Murawski
ul. Bohaterów Warszawy 12
78-400 Szczecinek
NIP: 852 248 23 21
Termin płatności: 19.03.25
Sposób płatności: przelew
"#;

    const UNKNOWN_VENDOR: &str = "FAKTURA nr 15/2025\nSprzedawca: Kowalczyk i Syn Sp. j.\nNIP: 111-111-11-11\nNabywca: Jan Zielony\nNIP: 222-222-22-22\n";

    fn pipeline() -> (InvoicePipeline, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = InvoicePipeline::with_store(&FaktagConfig::default(), store.clone());
        (pipeline, store)
    }

    fn completed(outcome: ProcessingOutcome) -> InvoiceRecord {
        match outcome {
            ProcessingOutcome::Completed(record) => record,
            ProcessingOutcome::NeedsClassification(p) => {
                panic!("expected a completed record, got pending {:?}", p.suggestion)
            }
        }
    }

    #[tokio::test]
    async fn test_override_vendor_completes_and_is_remembered() {
        let (pipeline, store) = pipeline();

        let first = completed(pipeline.process_text(ORLEN_INVOICE, Some("orlen.pdf")).await.unwrap());
        assert_eq!(first.mpk, "MPK710");
        assert_eq!(first.group, "7/2");
        assert_eq!(first.sequential_number, "KJ_O_0001");
        assert_eq!(first.label, "7/2;MPK710;KJ_O_0001");
        assert_eq!(first.file_name.as_deref(), Some("orlen.pdf"));

        let saved = store.get_vendor("orlensa").await.unwrap().unwrap();
        assert_eq!(saved.mpk, "MPK710");

        let second = completed(pipeline.process_text(ORLEN_INVOICE, None).await.unwrap());
        assert_eq!(second.sequence, 2);
        assert_eq!(second.label, "7/2;MPK710;KJ_O_0002");
    }

    #[tokio::test]
    async fn test_low_confidence_goes_manual_then_learns() {
        let (pipeline, store) = pipeline();

        let outcome = pipeline.process_text(UNKNOWN_VENDOR, None).await.unwrap();
        let ProcessingOutcome::NeedsClassification(pending) = outcome else {
            panic!("unknown vendor should need classification");
        };
        assert!(!pending.suggestion.detected);
        assert_eq!(pending.fields.vendor_nip.as_deref(), Some("1111111111"));
        // nothing allocated yet
        assert_eq!(store.get_counter("2222222222").await.unwrap(), None);

        let codes = CategoryCodes::new("MPK500", "5/1");
        let record = pipeline
            .complete_manual(pending, codes, Some("Kowalczyk".to_string()))
            .await
            .unwrap();
        assert_eq!(record.vendor_name, "Kowalczyk");
        assert_eq!(record.sequential_number, format!("001/{}", current_year()));
        assert_eq!(
            store.get_vendor_name("1111111111").await.unwrap().as_deref(),
            Some("Kowalczyk")
        );

        // the NIP now maps to the confirmed name, whose codes are stored
        let again = completed(pipeline.process_text(UNKNOWN_VENDOR, None).await.unwrap());
        assert_eq!(again.vendor_name, "Kowalczyk");
        assert_eq!(again.mpk, "MPK500");
        assert_eq!(again.sequential_number, format!("002/{}", current_year()));
    }

    #[tokio::test]
    async fn test_buyer_nip_corrected_by_rule() {
        let (pipeline, _) = pipeline();
        let text = "Faktura VAT nr FV/3/2025\nSprzedawca: Orlen S.A.\nNIP: 774-00-01-454\nNabywca: QBORG Spółka z o.o.\nul. 3 Maja 8\nNIP: 852-266-92-33\n";

        let record = completed(pipeline.process_text(text, None).await.unwrap());
        assert_eq!(record.buyer_nip, "8522669232");
        assert_eq!(record.label, "7/2;MPK710;KT_O_0001");
    }

    #[tokio::test]
    async fn test_remembered_buyer_corrects_nip() {
        let (pipeline, _) = pipeline();
        pipeline
            .remember_buyer("5555555555", "Kowalski Budownictwo", "")
            .await
            .unwrap();

        let text = "Sprzedawca: Orlen S.A.\nNIP: 774-00-01-454\nNabywca: Kowalski Budownictwo S.A.\nNIP: 555-555-55-50\n";
        let record = completed(pipeline.process_text(text, None).await.unwrap());
        assert_eq!(record.buyer_nip, "5555555555");
    }

    #[tokio::test]
    async fn test_edit_regenerates_label_and_keeps_number() {
        let (pipeline, _) = pipeline();
        let record = completed(pipeline.process_text(ORLEN_INVOICE, None).await.unwrap());

        let edit = InvoiceEdit {
            vendor_name: Some("BP Europa SE".to_string()),
            mpk: Some("MPK700".to_string()),
            client_number: Some("K-17".to_string()),
            ..Default::default()
        };
        let edited = pipeline.apply_edit(record.clone(), edit).await.unwrap();

        assert_eq!(edited.sequence, record.sequence);
        assert_eq!(edited.sequential_number, "KJ_B_0001");
        assert_eq!(edited.label, "7/2;MPK700;KJ_B_0001;K-17");
        assert!(edited.last_modified.is_some());
    }

    #[tokio::test]
    async fn test_edit_to_another_buyer_draws_its_next_number() {
        let (pipeline, store) = pipeline();
        let other_buyer = "Faktura VAT nr FV/1/2025\nSprzedawca: Orlen S.A.\nNIP: 774-00-01-454\nNabywca: Jan Zielony\nNIP: 123-456-78-90\n";

        let existing = completed(pipeline.process_text(other_buyer, None).await.unwrap());
        assert_eq!(existing.label, format!("7/2;MPK710;001/{}", current_year()));
        let record = completed(pipeline.process_text(ORLEN_INVOICE, None).await.unwrap());
        assert_eq!(record.sequential_number, "KJ_O_0001");

        let moved = pipeline
            .apply_edit(
                record,
                InvoiceEdit {
                    buyer_nip: Some("1234567890".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.sequence, 2);
        assert_eq!(moved.label, format!("7/2;MPK710;002/{}", current_year()));
        assert_ne!(moved.label, existing.label);
        assert_eq!(
            store.get_counter("1234567890").await.unwrap().map(|c| c.last_number),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_edit_buyer_nip_fills_known_name() {
        let (pipeline, _) = pipeline();
        pipeline.remember_buyer("5555555555", "Kowalski Budownictwo", "").await.unwrap();
        let record = completed(pipeline.process_text(ORLEN_INVOICE, None).await.unwrap());

        let edited = pipeline
            .apply_edit(
                record,
                InvoiceEdit {
                    buyer_nip: Some("5555555555".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.buyer_name, "Kowalski Budownictwo");
    }

    #[tokio::test]
    async fn test_client_number_assignment() {
        let (pipeline, _) = pipeline();
        let record = completed(pipeline.process_text(ORLEN_INVOICE, None).await.unwrap());

        let record = pipeline.assign_client_number(record, " 42 ");
        assert_eq!(record.client_number.as_deref(), Some("42"));
        assert_eq!(record.label, "7/2;MPK710;KJ_O_0001;42");
        assert!(record.last_modified.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_document_fails() {
        let (pipeline, _) = pipeline();
        let doc = RawDocument::new(b"not a pdf".to_vec(), MediaType::Pdf);
        assert!(pipeline.process(doc).await.is_err());
    }
}
