//! End-to-end statement scenario
//!
//! One company's March: 500.00 of storage and 75.00 of service charges,
//! finalized as the first invoice of the year, then corrected by 50.00.

use anyhow::Result;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, Currency};
use domain_billing::{
    AdjustmentLine, ChargeCategory, EngineConfig, StatementStatus,
};
use test_utils::{MoneyFixtures, PeriodFixtures, ServiceChargeBuilder, StayBuilder, TestEngine};

#[tokio::test]
async fn test_march_statement_lifecycle() -> Result<()> {
    test_utils::telemetry::init();
    let harness = TestEngine::with_config(EngineConfig {
        settlement_currency: Currency::USD,
        reporting_currency: Currency::USD,
        batch_company_timeout_secs: 5,
    });
    let company = CompanyId::new();

    // 20 billable days at 25.00/day = 500.00 of storage.
    harness.charges.push_stay(
        StayBuilder::new(company)
            .arrived(PeriodFixtures::date(2026, 3, 1))
            .departed(PeriodFixtures::date(2026, 3, 21))
            .daily_rate(MoneyFixtures::flat_usd(dec!(25.00)))
            .build(),
    );
    // 75.00 of service charges.
    harness.charges.push_charge(
        ServiceChargeBuilder::new(company)
            .description("Crane lift")
            .on(PeriodFixtures::date(2026, 3, 5))
            .amount(MoneyFixtures::flat_usd(dec!(75.00)))
            .build(),
    );

    // Draft.
    let draft = harness
        .engine
        .create_draft(company, PeriodFixtures::march())
        .await?;
    assert_eq!(draft.totals.storage.settlement.amount(), dec!(500.00));
    assert_eq!(draft.totals.services.settlement.amount(), dec!(75.00));
    assert_eq!(draft.totals.total.settlement.amount(), dec!(575.00));

    // Finalize: first invoice of the year.
    let finalized = harness.engine.finalize(draft.id, "admin").await?;
    assert_eq!(
        finalized.invoice_number.unwrap().to_string(),
        "MTT-2026-0001"
    );

    // A 50.00 service-charge correction.
    let outcome = harness
        .engine
        .create_credit_note(
            finalized.id,
            "admin",
            vec![AdjustmentLine::correction(
                ChargeCategory::Service,
                None,
                "Crane lift overcharge",
                MoneyFixtures::flat_usd(dec!(50.00)),
            )],
        )
        .await?;

    let note = &outcome.credit_note;
    assert_eq!(note.invoice_number.unwrap().to_string(), "MTT-CR-2026-0001");
    assert_eq!(note.totals.total.settlement.amount(), dec!(-50.00));
    assert_eq!(note.original_id(), Some(finalized.id));

    // The original is untouched: still finalized, still 575.00.
    let original = harness.engine.store().fetch(finalized.id).await?;
    assert_eq!(original.status, StatementStatus::Finalized);
    assert_eq!(original.totals.total.settlement.amount(), dec!(575.00));
    Ok(())
}
