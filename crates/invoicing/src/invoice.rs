use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cyclebill_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use cyclebill_events::Event;

use crate::outcome::DiscardReason;
use crate::period::BillingPeriod;
use crate::totals::InvoiceLine;

/// Invoice identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Contract identifier. Contracts live outside this engine; drafts carry the
/// id so collaborators can fetch the contract's line items.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub AggregateId);

impl ContractId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ContractId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Draft invoice lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Initialized,
    Filled,
    Discarded,
}

/// Aggregate root: a draft invoice being computed for a contract.
///
/// The draft starts speculative: initialized with the period and billing
/// shape, then either filled with computed amounts or discarded when the
/// computation produced nothing billable. A filled non-dry-run invoice is
/// immutable; redelivered fill attempts are rejected as conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    tenant_id: Option<TenantId>,
    contract_id: Option<ContractId>,
    status: InvoiceStatus,
    period: Option<BillingPeriod>,
    billing_cycle_months: u32,
    off_cycle: bool,
    postpaid: bool,
    dry_run: bool,
    currency: String,
    amount: Decimal,
    vat: Decimal,
    total: Decimal,
    lines: Vec<InvoiceLine>,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-initialized aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            tenant_id: None,
            contract_id: None,
            status: InvoiceStatus::Initialized,
            period: None,
            billing_cycle_months: 0,
            off_cycle: false,
            postpaid: false,
            dry_run: false,
            currency: String::new(),
            amount: Decimal::ZERO,
            vat: Decimal::ZERO,
            total: Decimal::ZERO,
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn contract_id(&self) -> Option<ContractId> {
        self.contract_id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn period(&self) -> Option<BillingPeriod> {
        self.period
    }

    pub fn billing_cycle_months(&self) -> u32 {
        self.billing_cycle_months
    }

    pub fn is_off_cycle(&self) -> bool {
        self.off_cycle
    }

    pub fn is_postpaid(&self) -> bool {
        self.postpaid
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Currency code, pass-through metadata attached by the caller.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn vat(&self) -> Decimal {
        self.vat
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    /// The date service activity is judged at for this draft.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.period.map(|p| p.reference_date(self.postpaid))
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: InitializeInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub contract_id: ContractId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub billing_cycle_months: u32,
    pub off_cycle: bool,
    pub postpaid: bool,
    pub dry_run: bool,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: FillInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub lines: Vec<InvoiceLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DiscardInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardInvoice {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub reason: DiscardReason,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    InitializeInvoice(InitializeInvoice),
    FillInvoice(FillInvoice),
    DiscardInvoice(DiscardInvoice),
}

/// Event: InvoiceInitialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInitialized {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub contract_id: ContractId,
    pub period: BillingPeriod,
    pub billing_cycle_months: u32,
    pub off_cycle: bool,
    pub postpaid: bool,
    pub dry_run: bool,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceFilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilled {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub lines: Vec<InvoiceLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceDiscarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDiscarded {
    pub tenant_id: TenantId,
    pub invoice_id: InvoiceId,
    pub reason: DiscardReason,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceInitialized(InvoiceInitialized),
    InvoiceFilled(InvoiceFilled),
    InvoiceDiscarded(InvoiceDiscarded),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceInitialized(_) => "invoicing.invoice.initialized",
            InvoiceEvent::InvoiceFilled(_) => "invoicing.invoice.filled",
            InvoiceEvent::InvoiceDiscarded(_) => "invoicing.invoice.discarded",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceInitialized(e) => e.occurred_at,
            InvoiceEvent::InvoiceFilled(e) => e.occurred_at,
            InvoiceEvent::InvoiceDiscarded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceInitialized(e) => {
                self.id = e.invoice_id;
                self.tenant_id = Some(e.tenant_id);
                self.contract_id = Some(e.contract_id);
                self.period = Some(e.period);
                self.billing_cycle_months = e.billing_cycle_months;
                self.off_cycle = e.off_cycle;
                self.postpaid = e.postpaid;
                self.dry_run = e.dry_run;
                self.currency = e.currency.clone();
                self.status = InvoiceStatus::Initialized;
                self.created = true;
            }
            InvoiceEvent::InvoiceFilled(e) => {
                self.amount = e.amount;
                self.vat = e.vat;
                self.total = e.total;
                self.lines = e.lines.clone();
                self.status = InvoiceStatus::Filled;
            }
            InvoiceEvent::InvoiceDiscarded(_) => {
                self.status = InvoiceStatus::Discarded;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::InitializeInvoice(cmd) => self.handle_initialize(cmd),
            InvoiceCommand::FillInvoice(cmd) => self.handle_fill(cmd),
            InvoiceCommand::DiscardInvoice(cmd) => self.handle_discard(cmd),
        }
    }
}

impl Invoice {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn handle_initialize(&self, cmd: &InitializeInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already initialized"));
        }

        if cmd.billing_cycle_months == 0 {
            return Err(DomainError::validation(
                "billing cycle must span at least one month",
            ));
        }

        if cmd.off_cycle && cmd.postpaid {
            return Err(DomainError::validation("off-cycle invoices are prepaid"));
        }

        let period = BillingPeriod::new(cmd.period_start, cmd.period_end)?;

        Ok(vec![InvoiceEvent::InvoiceInitialized(InvoiceInitialized {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            contract_id: cmd.contract_id,
            period,
            billing_cycle_months: cmd.billing_cycle_months,
            off_cycle: cmd.off_cycle,
            postpaid: cmd.postpaid,
            dry_run: cmd.dry_run,
            currency: cmd.currency.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_fill(&self, cmd: &FillInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found("invoice does not exist"));
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        match self.status {
            InvoiceStatus::Discarded => {
                return Err(DomainError::invariant("cannot fill a discarded invoice"));
            }
            // Dry runs may recompute; a finalized invoice is immutable. This
            // is what makes redelivered fill requests safe.
            InvoiceStatus::Filled if !self.dry_run => {
                return Err(DomainError::conflict("invoice already filled"));
            }
            _ => {}
        }

        if cmd.lines.is_empty() {
            return Err(DomainError::validation("cannot fill invoice without lines"));
        }

        let mut amount = Decimal::ZERO;
        let mut vat = Decimal::ZERO;
        for line in &cmd.lines {
            if line.total != line.amount + line.vat {
                return Err(DomainError::invariant(
                    "line total must equal amount plus vat",
                ));
            }
            amount += line.amount;
            vat += line.vat;
        }

        if cmd.amount != amount || cmd.vat != vat {
            return Err(DomainError::invariant(
                "invoice amounts must equal the sum of their lines",
            ));
        }
        if cmd.total != amount + vat {
            return Err(DomainError::invariant(
                "invoice total must equal amount plus vat",
            ));
        }

        Ok(vec![InvoiceEvent::InvoiceFilled(InvoiceFilled {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            amount: cmd.amount,
            vat: cmd.vat,
            total: cmd.total,
            lines: cmd.lines.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_discard(&self, cmd: &DiscardInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found("invoice does not exist"));
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        match self.status {
            InvoiceStatus::Filled => {
                return Err(DomainError::invariant("cannot discard a filled invoice"));
            }
            InvoiceStatus::Discarded => {
                return Err(DomainError::conflict("invoice already discarded"));
            }
            InvoiceStatus::Initialized => {}
        }

        Ok(vec![InvoiceEvent::InvoiceDiscarded(InvoiceDiscarded {
            tenant_id: cmd.tenant_id,
            invoice_id: cmd.invoice_id,
            reason: cmd.reason,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::{LineageId, ServiceLineItemId};
    use crate::rate::BillingFrequency;
    use core::str::FromStr;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_invoice_id() -> InvoiceId {
        InvoiceId::new(AggregateId::new())
    }

    fn test_contract_id() -> ContractId {
        ContractId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn initialize_cmd(tenant_id: TenantId, invoice_id: InvoiceId) -> InitializeInvoice {
        InitializeInvoice {
            tenant_id,
            invoice_id,
            contract_id: test_contract_id(),
            period_start: date(2025, 4, 1),
            period_end: date(2025, 4, 30),
            billing_cycle_months: 1,
            off_cycle: false,
            postpaid: false,
            dry_run: false,
            currency: "USD".into(),
            occurred_at: test_time(),
        }
    }

    fn test_line(amount: &str, vat: &str) -> InvoiceLine {
        let amount = d(amount);
        let vat = d(vat);
        InvoiceLine {
            service_line_item_id: ServiceLineItemId::new(AggregateId::new()),
            lineage_id: LineageId::new(AggregateId::new()),
            name: "platform fee".into(),
            billed: BillingFrequency::Monthly,
            quantity: 1,
            unit_price: amount,
            amount,
            vat,
            total: amount + vat,
        }
    }

    fn initialized(tenant_id: TenantId, invoice_id: InvoiceId) -> Invoice {
        let mut invoice = Invoice::empty(invoice_id);
        let events = invoice
            .handle(&InvoiceCommand::InitializeInvoice(initialize_cmd(
                tenant_id, invoice_id,
            )))
            .unwrap();
        for e in &events {
            invoice.apply(e);
        }
        invoice
    }

    fn fill_cmd(tenant_id: TenantId, invoice_id: InvoiceId, lines: Vec<InvoiceLine>) -> FillInvoice {
        let amount: Decimal = lines.iter().map(|l| l.amount).sum();
        let vat: Decimal = lines.iter().map(|l| l.vat).sum();
        FillInvoice {
            tenant_id,
            invoice_id,
            amount,
            vat,
            total: amount + vat,
            lines,
            occurred_at: test_time(),
        }
    }

    #[test]
    fn initialize_emits_invoice_initialized_event() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let invoice = Invoice::empty(invoice_id);

        let events = invoice
            .handle(&InvoiceCommand::InitializeInvoice(initialize_cmd(
                tenant_id, invoice_id,
            )))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            InvoiceEvent::InvoiceInitialized(e) => {
                assert_eq!(e.tenant_id, tenant_id);
                assert_eq!(e.invoice_id, invoice_id);
                assert_eq!(e.period.days_inclusive(), 30);
                assert_eq!(e.billing_cycle_months, 1);
                assert_eq!(e.currency, "USD");
            }
            _ => panic!("Expected InvoiceInitialized event"),
        }
    }

    #[test]
    fn initialize_rejects_inverted_periods_and_zero_cycles() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let invoice = Invoice::empty(invoice_id);

        let mut cmd = initialize_cmd(tenant_id, invoice_id);
        cmd.period_end = cmd.period_start;
        assert!(
            invoice
                .handle(&InvoiceCommand::InitializeInvoice(cmd))
                .is_err()
        );

        let mut cmd = initialize_cmd(tenant_id, invoice_id);
        cmd.billing_cycle_months = 0;
        assert!(
            invoice
                .handle(&InvoiceCommand::InitializeInvoice(cmd))
                .is_err()
        );
    }

    #[test]
    fn off_cycle_drafts_must_be_prepaid() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let invoice = Invoice::empty(invoice_id);

        let mut cmd = initialize_cmd(tenant_id, invoice_id);
        cmd.off_cycle = true;
        cmd.postpaid = true;
        let err = invoice
            .handle(&InvoiceCommand::InitializeInvoice(cmd))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("prepaid") => {}
            _ => panic!("Expected Validation for off-cycle postpaid draft"),
        }
    }

    #[test]
    fn fill_records_amounts_and_lines() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let mut invoice = initialized(tenant_id, invoice_id);

        let lines = vec![test_line("100.00", "20.00"), test_line("50.00", "0.00")];
        let events = invoice
            .handle(&InvoiceCommand::FillInvoice(fill_cmd(
                tenant_id, invoice_id, lines,
            )))
            .unwrap();
        assert_eq!(events.len(), 1);
        invoice.apply(&events[0]);

        assert_eq!(invoice.status(), InvoiceStatus::Filled);
        assert_eq!(invoice.amount(), d("150.00"));
        assert_eq!(invoice.vat(), d("20.00"));
        assert_eq!(invoice.total(), d("170.00"));
        assert_eq!(invoice.lines().len(), 2);
        assert_eq!(invoice.version(), 2);
    }

    #[test]
    fn fill_rejects_sums_that_do_not_match_lines() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let invoice = initialized(tenant_id, invoice_id);

        let mut cmd = fill_cmd(tenant_id, invoice_id, vec![test_line("100.00", "20.00")]);
        cmd.amount = d("99.00");
        let err = invoice
            .handle(&InvoiceCommand::FillInvoice(cmd))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("sum of their lines") => {}
            _ => panic!("Expected InvariantViolation for mismatched sums"),
        }
    }

    #[test]
    fn fill_rejects_empty_line_sets() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let invoice = initialized(tenant_id, invoice_id);

        let err = invoice
            .handle(&InvoiceCommand::FillInvoice(fill_cmd(
                tenant_id,
                invoice_id,
                Vec::new(),
            )))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("without lines") => {}
            _ => panic!("Expected Validation for empty fill"),
        }
    }

    #[test]
    fn finalized_invoices_reject_a_second_fill() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let mut invoice = initialized(tenant_id, invoice_id);

        let cmd = fill_cmd(tenant_id, invoice_id, vec![test_line("100.00", "0.00")]);
        let events = invoice
            .handle(&InvoiceCommand::FillInvoice(cmd.clone()))
            .unwrap();
        invoice.apply(&events[0]);

        // A redelivered fill request must not double-apply.
        let err = invoice
            .handle(&InvoiceCommand::FillInvoice(cmd))
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) if msg.contains("already filled") => {}
            _ => panic!("Expected Conflict for second fill"),
        }
    }

    #[test]
    fn dry_run_drafts_may_be_refilled() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let mut invoice = Invoice::empty(invoice_id);
        let mut init = initialize_cmd(tenant_id, invoice_id);
        init.dry_run = true;
        let events = invoice
            .handle(&InvoiceCommand::InitializeInvoice(init))
            .unwrap();
        invoice.apply(&events[0]);

        let first = fill_cmd(tenant_id, invoice_id, vec![test_line("100.00", "0.00")]);
        let events = invoice.handle(&InvoiceCommand::FillInvoice(first)).unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.total(), d("100.00"));

        let second = fill_cmd(tenant_id, invoice_id, vec![test_line("80.00", "0.00")]);
        let events = invoice
            .handle(&InvoiceCommand::FillInvoice(second))
            .unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.total(), d("80.00"));
        assert_eq!(invoice.status(), InvoiceStatus::Filled);
    }

    #[test]
    fn discard_is_for_unfilled_drafts_only() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let mut invoice = initialized(tenant_id, invoice_id);

        let fill = fill_cmd(tenant_id, invoice_id, vec![test_line("100.00", "0.00")]);
        let events = invoice.handle(&InvoiceCommand::FillInvoice(fill)).unwrap();
        invoice.apply(&events[0]);

        let err = invoice
            .handle(&InvoiceCommand::DiscardInvoice(DiscardInvoice {
                tenant_id,
                invoice_id,
                reason: DiscardReason::ZeroTotal,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("filled") => {}
            _ => panic!("Expected InvariantViolation for discarding a filled invoice"),
        }
    }

    #[test]
    fn discarded_drafts_accept_nothing_further() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let mut invoice = initialized(tenant_id, invoice_id);

        let events = invoice
            .handle(&InvoiceCommand::DiscardInvoice(DiscardInvoice {
                tenant_id,
                invoice_id,
                reason: DiscardReason::NoBillableLines,
                occurred_at: test_time(),
            }))
            .unwrap();
        invoice.apply(&events[0]);
        assert_eq!(invoice.status(), InvoiceStatus::Discarded);

        let err = invoice
            .handle(&InvoiceCommand::FillInvoice(fill_cmd(
                tenant_id,
                invoice_id,
                vec![test_line("10.00", "0.00")],
            )))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("discarded") => {}
            _ => panic!("Expected InvariantViolation for filling a discarded invoice"),
        }

        let err = invoice
            .handle(&InvoiceCommand::DiscardInvoice(DiscardInvoice {
                tenant_id,
                invoice_id,
                reason: DiscardReason::NoBillableLines,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) if msg.contains("already discarded") => {}
            _ => panic!("Expected Conflict for double discard"),
        }
    }

    #[test]
    fn tenant_mismatch_is_rejected() {
        let tenant_id = test_tenant_id();
        let invoice_id = test_invoice_id();
        let invoice = initialized(tenant_id, invoice_id);

        let err = invoice
            .handle(&InvoiceCommand::FillInvoice(fill_cmd(
                test_tenant_id(),
                invoice_id,
                vec![test_line("10.00", "0.00")],
            )))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("tenant mismatch") => {}
            _ => panic!("Expected InvariantViolation for tenant mismatch"),
        }
    }
}
