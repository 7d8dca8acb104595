//! Lifecycle engine tests over the in-memory adapters

use anyhow::Result;
use rust_decimal_macros::dec;

use core_kernel::CompanyId;
use domain_billing::{
    AdjustmentLine, BillingError, ChargeCategory, SequenceKind, StatementStatus,
};
use test_utils::{MoneyFixtures, PeriodFixtures, ServiceChargeBuilder, StayBuilder, TestEngine};

fn seeded_engine() -> (TestEngine, CompanyId) {
    test_utils::telemetry::init();
    let harness = TestEngine::new();
    let company = CompanyId::new();

    // 10 billable days at the standard rate, plus one service charge.
    harness.charges.push_stay(
        StayBuilder::new(company)
            .arrived(PeriodFixtures::date(2026, 3, 1))
            .departed(PeriodFixtures::date(2026, 3, 11))
            .build(),
    );
    harness
        .charges
        .push_charge(ServiceChargeBuilder::new(company).build());

    (harness, company)
}

#[tokio::test]
async fn test_create_draft_rolls_up_charges() -> Result<()> {
    let (harness, company) = seeded_engine();

    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;

    assert_eq!(draft.status, StatementStatus::Draft);
    assert!(draft.invoice_number.is_none());
    assert_eq!(draft.storage_items.len(), 1);
    assert_eq!(draft.service_items.len(), 1);
    assert_eq!(draft.totals.storage.reporting.amount(), dec!(50.00));
    assert_eq!(draft.totals.services.reporting.amount(), dec!(8.00));
    assert_eq!(draft.totals.total.reporting.amount(), dec!(58.00));
    assert_eq!(draft.totals.billable_days, 10);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_draft_rejected() -> Result<()> {
    let (harness, company) = seeded_engine();
    harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;

    let err = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::DraftAlreadyExists { .. }));
    assert_eq!(harness.store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_regenerate_picks_up_new_charges() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;

    // A late-entered charge dated inside March.
    harness.charges.push_charge(
        ServiceChargeBuilder::new(company)
            .description("Weighing")
            .on(PeriodFixtures::date(2026, 3, 20))
            .amount(MoneyFixtures::dual(dec!(50000), dec!(4.00)))
            .build(),
    );

    let regenerated = harness.engine.regenerate(draft.id).await?;
    assert_eq!(regenerated.service_items.len(), 2);
    assert_eq!(regenerated.totals.services.reporting.amount(), dec!(12.00));
    assert_eq!(regenerated.totals.total.reporting.amount(), dec!(62.00));
    Ok(())
}

#[tokio::test]
async fn test_regenerate_after_finalize_fails() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;
    harness.engine.finalize(draft.id, "admin").await?;

    let err = harness.engine.regenerate(draft.id).await.unwrap_err();
    assert!(matches!(err, BillingError::ImmutableStatement { .. }));
    Ok(())
}

#[tokio::test]
async fn test_finalize_is_idempotent_and_never_reallocates() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;

    let first = harness.engine.finalize(draft.id, "admin").await?;
    let number = first.invoice_number.expect("assigned at finalization");
    assert_eq!(number.to_string(), "MTT-2026-0001");

    let second = harness.engine.finalize(draft.id, "admin").await?;
    assert_eq!(second.invoice_number, Some(number));
    // No second allocation happened.
    assert_eq!(
        harness.allocator.last_issued(SequenceKind::Invoice, 2026),
        Some(1)
    );
    Ok(())
}

#[tokio::test]
async fn test_mark_paid_flow() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;

    // Paying a draft is a guard violation.
    let err = harness.engine.mark_paid(draft.id, "cashier").await.unwrap_err();
    assert!(matches!(err, BillingError::InvalidTransition { .. }));

    harness.engine.finalize(draft.id, "admin").await?;
    let paid = harness.engine.mark_paid(draft.id, "cashier").await?;
    assert_eq!(paid.status, StatementStatus::Paid);
    assert_eq!(paid.paid_by.as_deref(), Some("cashier"));

    // Repeat call is a no-op success.
    let again = harness.engine.mark_paid(draft.id, "cashier").await?;
    assert_eq!(again.paid_at, paid.paid_at);
    Ok(())
}

#[tokio::test]
async fn test_credit_note_links_and_leaves_original_untouched() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;
    let finalized = harness.engine.finalize(draft.id, "admin").await?;

    let outcome = harness
        .engine
        .create_credit_note(
            finalized.id,
            "admin",
            vec![AdjustmentLine::correction(
                ChargeCategory::Service,
                None,
                "Crane lift overcharge",
                MoneyFixtures::dual(dec!(50000), dec!(4.00)),
            )],
        )
        .await?;

    assert_eq!(
        outcome.credit_note.invoice_number.unwrap().to_string(),
        "MTT-CR-2026-0001"
    );
    assert_eq!(outcome.credit_note.original_id(), Some(finalized.id));
    assert_eq!(
        outcome.credit_note.totals.total.reporting.amount(),
        dec!(-4.00)
    );

    // Partial reversal: the original stays finalized with its totals intact.
    assert_eq!(outcome.original.status, StatementStatus::Finalized);
    let reread = harness.engine.store().fetch(finalized.id).await?;
    assert_eq!(reread.totals, finalized.totals);
    assert_eq!(reread.storage_items, finalized.storage_items);
    assert_eq!(reread.service_items, finalized.service_items);
    Ok(())
}

#[tokio::test]
async fn test_cumulative_exact_reversal_cancels_original() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;
    let finalized = harness.engine.finalize(draft.id, "admin").await?;
    let total = finalized.totals.total;

    // First credit note reverses the service charge only.
    let partial = harness
        .engine
        .create_credit_note(
            finalized.id,
            "admin",
            vec![AdjustmentLine::correction(
                ChargeCategory::Service,
                None,
                "Service reversal",
                finalized.totals.services,
            )],
        )
        .await?;
    assert_eq!(partial.original.status, StatementStatus::Finalized);

    // Second credit note reverses the rest; cumulative sum hits zero.
    let full = harness
        .engine
        .create_credit_note(
            finalized.id,
            "admin",
            vec![AdjustmentLine::correction(
                ChargeCategory::Storage,
                None,
                "Storage reversal",
                finalized.totals.storage,
            )],
        )
        .await?;
    assert_eq!(full.original.status, StatementStatus::Cancelled);

    // The cancelled original keeps its number and totals.
    let reread = harness.engine.store().fetch(finalized.id).await?;
    assert_eq!(reread.invoice_number, finalized.invoice_number);
    assert_eq!(reread.totals.total, total);
    Ok(())
}

#[tokio::test]
async fn test_overreversal_does_not_cancel() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;
    let finalized = harness.engine.finalize(draft.id, "admin").await?;

    // Correct more than the original total: cumulative sum goes negative,
    // which is not an exact reversal.
    let outcome = harness
        .engine
        .create_credit_note(
            finalized.id,
            "admin",
            vec![AdjustmentLine::correction(
                ChargeCategory::Service,
                None,
                "Overcorrection",
                MoneyFixtures::dual(dec!(9000000), dec!(750.00)),
            )],
        )
        .await?;
    assert_eq!(outcome.original.status, StatementStatus::Finalized);
    Ok(())
}

#[tokio::test]
async fn test_credit_note_guards() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;

    let correction = || {
        vec![AdjustmentLine::correction(
            ChargeCategory::Service,
            None,
            "Correction",
            MoneyFixtures::dual(dec!(1000), dec!(0.08)),
        )]
    };

    // Against a draft.
    let err = harness
        .engine
        .create_credit_note(draft.id, "admin", correction())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::InvalidOriginalState { .. }));

    // Against a credit note.
    let finalized = harness.engine.finalize(draft.id, "admin").await?;
    let outcome = harness
        .engine
        .create_credit_note(finalized.id, "admin", correction())
        .await?;
    let err = harness
        .engine
        .create_credit_note(outcome.credit_note.id, "admin", correction())
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::InvalidOriginalState { .. }));

    // Invalid requests never touched the credit-note sequence twice.
    assert_eq!(
        harness
            .allocator
            .last_issued(SequenceKind::CreditNote, 2026),
        Some(1)
    );
    Ok(())
}

#[tokio::test]
async fn test_finalized_statement_reads_identically_over_time() -> Result<()> {
    let (harness, company) = seeded_engine();
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;
    let finalized = harness.engine.finalize(draft.id, "admin").await?;

    // Interleave unrelated lifecycle activity.
    harness.engine.mark_paid(finalized.id, "cashier").await?;
    harness
        .engine
        .create_credit_note(
            finalized.id,
            "admin",
            vec![AdjustmentLine::correction(
                ChargeCategory::Service,
                None,
                "Correction",
                MoneyFixtures::dual(dec!(1000), dec!(0.08)),
            )],
        )
        .await?;

    let reread = harness.engine.store().fetch(finalized.id).await?;
    assert_eq!(reread.storage_items, finalized.storage_items);
    assert_eq!(reread.service_items, finalized.service_items);
    assert_eq!(reread.totals, finalized.totals);
    assert_eq!(reread.invoice_number, finalized.invoice_number);
    assert_eq!(reread.finalized_at, finalized.finalized_at);
    Ok(())
}
