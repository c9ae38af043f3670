//! In-memory billing store for tests, benchmarks and local development.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use chrono::{NaiveDate, Utc};

use cyclebill_core::{AggregateId, AggregateRoot, DomainError, ExpectedVersion, TenantId};
use cyclebill_events::{EventEnvelope, execute};
use cyclebill_invoicing::{
    ComputedInvoice, ContractId, DiscardInvoice, DiscardReason, FillInvoice, InitializeInvoice,
    Invoice, InvoiceCommand, InvoiceEvent, InvoiceId, LineageId, PriorInvoicedSnapshot,
    ServiceLineItem,
};

use crate::source::{ContractBillingSource, SourceError};
use crate::writer::{InvoiceWriter, WriterError};

/// Aggregate type tag on every envelope in an invoice stream.
pub const INVOICE_AGGREGATE_TYPE: &str = "invoicing.invoice";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct StreamKey {
    tenant_id: TenantId,
    aggregate_id: AggregateId,
}

impl StreamKey {
    fn invoice(tenant_id: TenantId, invoice_id: InvoiceId) -> Self {
        Self {
            tenant_id,
            aggregate_id: invoice_id.0,
        }
    }
}

#[derive(Debug)]
struct LockPoisoned;

impl From<LockPoisoned> for WriterError {
    fn from(_: LockPoisoned) -> Self {
        WriterError::Unavailable(anyhow!("billing store lock poisoned"))
    }
}

impl From<LockPoisoned> for SourceError {
    fn from(_: LockPoisoned) -> Self {
        SourceError::Unavailable(anyhow!("billing store lock poisoned"))
    }
}

/// In-memory contract and invoice store.
///
/// One lock over all state, so a fill lands together with its ledger
/// update. Draft aggregates live in a registry map; their events go to
/// append-only per-invoice streams. Discarding removes the draft from the
/// registry while the stream keeps the trail.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryBillingStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    contracts: HashMap<(TenantId, ContractId), Vec<ServiceLineItem>>,
    drafts: HashMap<StreamKey, Invoice>,
    streams: HashMap<StreamKey, Vec<EventEnvelope<InvoiceEvent>>>,
    billed: HashMap<(TenantId, ContractId), HashMap<LineageId, PriorInvoicedSnapshot>>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a contract's service line item versions.
    pub fn seed_contract(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
        items: Vec<ServiceLineItem>,
    ) -> Result<(), WriterError> {
        let mut inner = self.write()?;
        inner.contracts.insert((tenant_id, contract_id), items);
        Ok(())
    }

    /// Initialize a draft invoice and return its aggregate state.
    pub fn create_draft(&self, cmd: InitializeInvoice) -> Result<Invoice, WriterError> {
        let key = StreamKey::invoice(cmd.tenant_id, cmd.invoice_id);
        let mut inner = self.write()?;
        if inner.streams.contains_key(&key) {
            // Discarded ids stay burned; their streams outlive the draft.
            return Err(WriterError::Rejected(DomainError::conflict(
                "invoice id already used",
            )));
        }
        let mut draft = Invoice::empty(cmd.invoice_id);
        let events = execute(&mut draft, &InvoiceCommand::InitializeInvoice(cmd))?;
        Self::append(&mut inner.streams, key, ExpectedVersion::Exact(0), &events)?;
        inner.drafts.insert(key, draft.clone());
        Ok(draft)
    }

    /// Current draft state, `None` once discarded (or never created).
    pub fn invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<Option<Invoice>, WriterError> {
        Ok(self
            .read()?
            .drafts
            .get(&StreamKey::invoice(tenant_id, invoice_id))
            .cloned())
    }

    /// Full event stream of an invoice, discarded ones included.
    pub fn events_for(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<Vec<EventEnvelope<InvoiceEvent>>, WriterError> {
        Ok(self
            .read()?
            .streams
            .get(&StreamKey::invoice(tenant_id, invoice_id))
            .cloned()
            .unwrap_or_default())
    }

    /// What a chain last billed, if it ever billed.
    pub fn billed_snapshot(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
        lineage_id: LineageId,
    ) -> Result<Option<PriorInvoicedSnapshot>, WriterError> {
        Ok(self
            .read()?
            .billed
            .get(&(tenant_id, contract_id))
            .and_then(|ledger| ledger.get(&lineage_id))
            .copied())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, LockPoisoned> {
        self.inner.read().map_err(|_| LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, LockPoisoned> {
        self.inner.write().map_err(|_| LockPoisoned)
    }

    fn append(
        streams: &mut HashMap<StreamKey, Vec<EventEnvelope<InvoiceEvent>>>,
        key: StreamKey,
        expected: ExpectedVersion,
        events: &[InvoiceEvent],
    ) -> Result<(), WriterError> {
        let stream = streams.entry(key).or_default();
        let current = stream.last().map(|e| e.sequence_number()).unwrap_or(0);
        expected.check(current)?;

        // Assign sequence numbers and append (append-only).
        let mut next = current + 1;
        for event in events {
            stream.push(EventEnvelope::record(
                key.tenant_id,
                key.aggregate_id,
                INVOICE_AGGREGATE_TYPE,
                next,
                event.clone(),
            ));
            next += 1;
        }
        Ok(())
    }
}

impl ContractBillingSource for InMemoryBillingStore {
    fn service_line_items(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
        _as_of: NaiveDate,
    ) -> Result<Vec<ServiceLineItem>, SourceError> {
        // Seeded contracts already carry their full amendment history;
        // there is no temporal cut to apply.
        let inner = self.read()?;
        match inner.contracts.get(&(tenant_id, contract_id)) {
            Some(items) => Ok(items.clone()),
            None => Err(SourceError::UnknownContract(contract_id)),
        }
    }

    fn prior_invoiced_snapshots(
        &self,
        tenant_id: TenantId,
        contract_id: ContractId,
    ) -> Result<HashMap<LineageId, PriorInvoicedSnapshot>, SourceError> {
        let inner = self.read()?;
        Ok(inner
            .billed
            .get(&(tenant_id, contract_id))
            .cloned()
            .unwrap_or_default())
    }
}

impl InvoiceWriter for InMemoryBillingStore {
    fn fill(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        computed: &ComputedInvoice,
        billed_basis: &HashMap<LineageId, PriorInvoicedSnapshot>,
    ) -> Result<(), WriterError> {
        let key = StreamKey::invoice(tenant_id, invoice_id);
        let mut inner = self.write()?;

        let Some(existing) = inner.drafts.get(&key) else {
            return Err(WriterError::UnknownInvoice(invoice_id));
        };
        let mut draft = existing.clone();
        let expected = ExpectedVersion::Exact(draft.version());

        let events = execute(
            &mut draft,
            &InvoiceCommand::FillInvoice(FillInvoice {
                tenant_id,
                invoice_id,
                amount: computed.amount,
                vat: computed.vat,
                total: computed.total,
                lines: computed.lines.clone(),
                occurred_at: Utc::now(),
            }),
        )?;
        Self::append(&mut inner.streams, key, expected, &events)?;

        // The ledger only learns from invoices a customer will see.
        if !draft.is_dry_run() {
            if let Some(contract_id) = draft.contract_id() {
                inner
                    .billed
                    .entry((tenant_id, contract_id))
                    .or_default()
                    .extend(billed_basis.iter().map(|(k, v)| (*k, *v)));
            }
        }
        inner.drafts.insert(key, draft);
        Ok(())
    }

    fn permanently_delete(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        reason: DiscardReason,
    ) -> Result<(), WriterError> {
        let key = StreamKey::invoice(tenant_id, invoice_id);
        let mut inner = self.write()?;

        let Some(existing) = inner.drafts.get(&key) else {
            return Err(WriterError::UnknownInvoice(invoice_id));
        };
        let mut draft = existing.clone();
        let expected = ExpectedVersion::Exact(draft.version());

        let events = execute(
            &mut draft,
            &InvoiceCommand::DiscardInvoice(DiscardInvoice {
                tenant_id,
                invoice_id,
                reason,
                occurred_at: Utc::now(),
            }),
        )?;
        Self::append(&mut inner.streams, key, expected, &events)?;

        inner.drafts.remove(&key);
        Ok(())
    }
}
