//! Billing engine: money computation and portfolio aggregation.
//!
//! All arithmetic is fixed-point `Decimal`; totals reconcile exactly no
//! matter how often they are recomputed.

use crate::models::{ExpenseLine, Invoice, InvoiceStatus};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use service_core::error::AppError;
use std::collections::HashMap;

/// Computed monetary totals for one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Derive subtotal, tax, and total from an expense list.
///
/// Only `billable` lines contribute; non-billable lines stay on the invoice
/// for record-keeping but count as zero. Tax is rounded to cent precision
/// with banker's rounding (round-half-to-even), so recomputing the same
/// input always yields the same cents. Pure: no side effects, safe to rerun
/// on every update.
pub fn compute_totals(expenses: &[ExpenseLine], tax_rate: Decimal) -> InvoiceTotals {
    let subtotal: Decimal = expenses
        .iter()
        .filter(|line| line.billable)
        .map(|line| line.cost * Decimal::from(line.quantity))
        .sum();

    let tax = (subtotal * tax_rate).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let total = subtotal + tax;

    InvoiceTotals {
        subtotal,
        tax,
        total,
    }
}

/// Reject malformed expense lines before anything is written.
pub fn validate_expenses(expenses: &[ExpenseLine]) -> Result<(), AppError> {
    for (idx, line) in expenses.iter().enumerate() {
        if line.cost.is_sign_negative() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Expense line {}: cost must not be negative",
                idx
            )));
        }
        if line.quantity < 0 {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Expense line {}: quantity must not be negative",
                idx
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsTotals {
    #[serde(rename = "totalInvoiced")]
    pub total_invoiced: Decimal,
    #[serde(rename = "totalPaid")]
    pub total_paid: Decimal,
    #[serde(rename = "totalOutstanding")]
    pub total_outstanding: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusBucket {
    pub count: u64,
    pub total: Decimal,
}

/// Portfolio statistics, built as a streaming fold over an invoice cursor:
/// one `observe` per invoice, O(n) in the scope, no rescanning.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceStats {
    pub totals: StatsTotals,
    #[serde(rename = "byStatus")]
    pub by_status: HashMap<String, StatusBucket>,
}

impl InvoiceStats {
    pub fn observe(&mut self, invoice: &Invoice) {
        self.totals.total_invoiced += invoice.total;
        match invoice.status {
            InvoiceStatus::Paid => self.totals.total_paid += invoice.total,
            InvoiceStatus::Outstanding => self.totals.total_outstanding += invoice.total,
            // Drafts count toward totalInvoiced only; they are not yet owed.
            InvoiceStatus::Draft => {}
        }

        let bucket = self
            .by_status
            .entry(invoice.status.as_str().to_string())
            .or_default();
        bucket.count += 1;
        bucket.total += invoice.total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(cost: Decimal, quantity: i64, billable: bool) -> ExpenseLine {
        ExpenseLine {
            description: "expense".to_string(),
            cost,
            quantity,
            billable,
        }
    }

    fn tax_rate() -> Decimal {
        Decimal::new(10, 2) // 0.10
    }

    fn invoice_with(total: Decimal, status: InvoiceStatus) -> Invoice {
        let now = Utc::now();
        let mut invoice = Invoice::new(
            "case-1".to_string(),
            "lawyer-1".to_string(),
            now,
            vec![],
            total,
            Decimal::ZERO,
            total,
            now,
        );
        invoice.status = status;
        invoice
    }

    #[test]
    fn billable_lines_only() {
        // Scenario A: 100 x 2 billable + 50 x 1 non-billable at 10% tax.
        let expenses = vec![
            line(Decimal::from(100), 2, true),
            line(Decimal::from(50), 1, false),
        ];

        let totals = compute_totals(&expenses, tax_rate());
        assert_eq!(totals.subtotal, Decimal::from(200));
        assert_eq!(totals.tax, Decimal::from(20));
        assert_eq!(totals.total, Decimal::from(220));
    }

    #[test]
    fn subtotal_is_order_insensitive() {
        let a = line(Decimal::new(1999, 2), 3, true);
        let b = line(Decimal::new(50, 1), 7, true);
        let c = line(Decimal::from(12), 1, false);

        let forward = compute_totals(&[a.clone(), b.clone(), c.clone()], tax_rate());
        let reversed = compute_totals(&[c, b, a], tax_rate());

        assert_eq!(forward.subtotal, reversed.subtotal);
        assert_eq!(forward.tax, reversed.tax);
        assert_eq!(forward.total, reversed.total);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let expenses = vec![
            line(Decimal::new(3333, 2), 3, true),
            line(Decimal::new(101, 2), 9, true),
        ];

        let first = compute_totals(&expenses, tax_rate());
        let second = compute_totals(&expenses, tax_rate());
        assert_eq!(first, second);
    }

    #[test]
    fn total_is_exactly_subtotal_plus_tax() {
        let expenses = vec![line(Decimal::new(12345, 2), 7, true)];
        let totals = compute_totals(&expenses, Decimal::new(825, 4)); // 8.25%
        assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    #[test]
    fn tax_uses_bankers_rounding() {
        // Subtotal 0.25 at 10% gives 0.025; half-to-even rounds to 0.02.
        let expenses = vec![line(Decimal::new(25, 2), 1, true)];
        let totals = compute_totals(&expenses, tax_rate());
        assert_eq!(totals.tax, Decimal::new(2, 2));

        // Subtotal 0.35 at 10% gives 0.035; half-to-even rounds to 0.04.
        let expenses = vec![line(Decimal::new(35, 2), 1, true)];
        let totals = compute_totals(&expenses, tax_rate());
        assert_eq!(totals.tax, Decimal::new(4, 2));
    }

    #[test]
    fn all_non_billable_yields_zero() {
        let expenses = vec![
            line(Decimal::from(100), 2, false),
            line(Decimal::from(50), 1, false),
        ];
        let totals = compute_totals(&expenses, tax_rate());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn empty_expense_list_yields_zero() {
        let totals = compute_totals(&[], tax_rate());
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn negative_cost_is_rejected() {
        let expenses = vec![line(Decimal::from(-1), 1, true)];
        assert!(matches!(
            validate_expenses(&expenses),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let expenses = vec![line(Decimal::from(1), -2, true)];
        assert!(matches!(
            validate_expenses(&expenses),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn zero_cost_and_quantity_are_valid() {
        let expenses = vec![line(Decimal::ZERO, 0, true)];
        assert!(validate_expenses(&expenses).is_ok());
    }

    #[test]
    fn stats_split_paid_and_outstanding() {
        // Scenario C: 100 Paid, 200 Outstanding, 50 Draft.
        let mut stats = InvoiceStats::default();
        stats.observe(&invoice_with(Decimal::from(100), InvoiceStatus::Paid));
        stats.observe(&invoice_with(Decimal::from(200), InvoiceStatus::Outstanding));
        stats.observe(&invoice_with(Decimal::from(50), InvoiceStatus::Draft));

        assert_eq!(stats.totals.total_invoiced, Decimal::from(350));
        assert_eq!(stats.totals.total_paid, Decimal::from(100));
        assert_eq!(stats.totals.total_outstanding, Decimal::from(200));
    }

    #[test]
    fn paid_plus_outstanding_never_exceeds_invoiced() {
        let mut stats = InvoiceStats::default();
        stats.observe(&invoice_with(Decimal::from(75), InvoiceStatus::Draft));
        stats.observe(&invoice_with(Decimal::from(25), InvoiceStatus::Paid));

        assert!(
            stats.totals.total_paid + stats.totals.total_outstanding
                <= stats.totals.total_invoiced
        );
    }

    #[test]
    fn every_status_forms_its_own_bucket() {
        let mut stats = InvoiceStats::default();
        stats.observe(&invoice_with(Decimal::from(100), InvoiceStatus::Paid));
        stats.observe(&invoice_with(Decimal::from(40), InvoiceStatus::Paid));
        stats.observe(&invoice_with(Decimal::from(200), InvoiceStatus::Outstanding));

        let paid = &stats.by_status["Paid"];
        assert_eq!(paid.count, 2);
        assert_eq!(paid.total, Decimal::from(140));

        let outstanding = &stats.by_status["Outstanding"];
        assert_eq!(outstanding.count, 1);
        assert_eq!(outstanding.total, Decimal::from(200));

        assert!(!stats.by_status.contains_key("Draft"));
    }

    #[test]
    fn empty_scope_defaults_to_zero() {
        let stats = InvoiceStats::default();
        assert_eq!(stats.totals.total_invoiced, Decimal::ZERO);
        assert_eq!(stats.totals.total_paid, Decimal::ZERO);
        assert_eq!(stats.totals.total_outstanding, Decimal::ZERO);
        assert!(stats.by_status.is_empty());
    }
}
