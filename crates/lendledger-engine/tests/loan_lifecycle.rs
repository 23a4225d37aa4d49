//! Loan lifecycle: origination, installments, early payoff, settlement

mod common;

use common::{Harness, START};
use lendledger_engine::{
    Address, Amount, AuthError, FeeBps, LendingError, LoanEvent, LoanId, LoanTerms,
    PreconditionError,
};

#[test]
fn test_create_loan_disburses_and_records() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();

    assert_eq!(loan_id, LoanId::FIRST);
    let loan = h.engine.get_loan(loan_id);
    assert_eq!(loan.lender, h.lender);
    assert_eq!(loan.borrower, h.borrower);
    assert_eq!(loan.amount, Amount::new(1000));
    assert_eq!(loan.total_to_pay, Amount::new(1100));
    assert_eq!(loan.installment_amount, Amount::new(220));
    assert_eq!(loan.total_paid, Amount::ZERO);
    assert_eq!(loan.start_time, START);
    assert!(loan.active);

    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(4000));
    assert_eq!(h.env.bank.received_by(&h.borrower), Amount::new(1000));
    assert_eq!(h.engine.treasury_balance(), Amount::new(4000));

    let certificate = h.env.certificates.get(loan_id).unwrap();
    assert_eq!(certificate.owner, h.lender);
    assert_eq!(certificate.metadata_uri, "lendledger://loan/1");

    assert!(h.env.events.events().contains(&LoanEvent::LoanCreated {
        loan_id,
        lender: h.lender.clone(),
        borrower: h.borrower.clone(),
        amount: Amount::new(1000),
    }));
}

#[test]
fn test_loan_ids_are_monotonic() {
    let h = Harness::new();
    let first = h.create_scenario_loan();
    let second = h.create_scenario_loan();
    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 2);
    assert_eq!(h.engine.loan_count(), 2);
    assert_eq!(h.engine.loans_by_borrower(&h.borrower).len(), 2);
}

#[test]
fn test_scenario_a_full_installment_repayment() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();

    h.pay_installments(loan_id, 4);
    assert!(h.engine.get_loan(loan_id).active);
    h.assert_treasury_conserved();

    h.pay_installments(loan_id, 1);
    let loan = h.engine.get_loan(loan_id);
    assert!(!loan.active);
    assert_eq!(loan.installments_paid, 5);
    assert_eq!(loan.total_paid, Amount::new(1100));

    // 4000 left after funding + 1100 repaid - 2 fee
    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(5098));
    assert_eq!(h.engine.accrued_fees(), Amount::new(2));
    assert_eq!(h.engine.treasury_balance(), Amount::new(5100));
    h.assert_treasury_conserved();

    let events = h.env.events.for_loan(loan_id);
    let tail = &events[events.len() - 2..];
    assert_eq!(
        tail,
        &[
            LoanEvent::LoanCompleted { loan_id },
            LoanEvent::PaymentMade {
                loan_id,
                amount: Amount::new(220)
            },
        ]
    );
}

#[test]
fn test_scenario_b_early_payoff_after_ten_days() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.env.clock.advance_days(10).unwrap();

    let quote = h.engine.quote_early_payoff(loan_id).unwrap();
    assert_eq!(quote.days_used, 10);
    assert_eq!(quote.daily_interest, Amount::new(3));
    assert_eq!(quote.real_total, Amount::new(1030));
    assert_eq!(quote.final_payment, Amount::new(1030));

    h.engine
        .pay_early(&h.borrower, loan_id, Amount::new(1030))
        .unwrap();

    let loan = h.engine.get_loan(loan_id);
    assert!(!loan.active);
    assert_eq!(loan.total_paid, Amount::new(1030));
    assert_eq!(loan.installments_paid, loan.installments);

    // Interest 30 at 200bp floors to a zero fee
    assert_eq!(h.engine.accrued_fees(), Amount::ZERO);
    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(5030));
    h.assert_treasury_conserved();

    let events = h.env.events.for_loan(loan_id);
    assert_eq!(
        events.last(),
        Some(&LoanEvent::EarlyPaymentMade {
            loan_id,
            amount: Amount::new(1030),
            days_used: 10,
        })
    );
}

#[test]
fn test_early_payoff_immediately_counts_one_day() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();

    let quote = h.engine.quote_early_payoff(loan_id).unwrap();
    assert_eq!(quote.days_used, 1);
    assert_eq!(quote.final_payment, Amount::new(1003));
}

#[test]
fn test_early_payoff_caps_at_thirty_days() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.env.clock.advance_days(400).unwrap();

    let quote = h.engine.quote_early_payoff(loan_id).unwrap();
    assert_eq!(quote.days_used, 30);
    assert_eq!(quote.real_total, Amount::new(1090));
}

#[test]
fn test_early_payoff_after_installments_mixes_rates() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.pay_installments(loan_id, 2);
    h.env.clock.advance_days(45).unwrap();

    // 1000 + 3 * 30 = 1090 prorated, 440 already paid at the schedule rate
    let quote = h.engine.quote_early_payoff(loan_id).unwrap();
    assert_eq!(quote.final_payment, Amount::new(650));

    h.engine.pay_early(&h.borrower, loan_id, Amount::new(650)).unwrap();
    let loan = h.engine.get_loan(loan_id);
    assert_eq!(loan.total_paid, Amount::new(1090));

    // Interest 90 at 200bp -> fee 1
    assert_eq!(h.engine.accrued_fees(), Amount::new(1));
    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(4000 + 1089));
    h.assert_treasury_conserved();
}

#[test]
fn test_early_payoff_wrong_amount_rejected() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.env.clock.advance_days(10).unwrap();

    for wrong in [1029, 1031] {
        let err = h
            .engine
            .pay_early(&h.borrower, loan_id, Amount::new(wrong))
            .unwrap_err();
        assert_eq!(
            err,
            LendingError::Precondition(PreconditionError::PaymentMismatch {
                expected: Amount::new(1030),
                received: Amount::new(wrong),
            })
        );
    }
    assert!(h.engine.get_loan(loan_id).active);
}

#[test]
fn test_early_payoff_after_partial_schedule() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    // 4 x 220 = 880 paid; same-day prorated total is 1003
    h.pay_installments(loan_id, 4);
    assert_eq!(
        h.engine.quote_early_payoff(loan_id).unwrap().final_payment,
        Amount::new(123)
    );
}

#[test]
fn test_early_payoff_nothing_owed() {
    let h = Harness::new();
    // Installment 200 already exceeds the day-one prorated total of 110
    let loan_id = h
        .engine
        .create_loan(
            &h.admin,
            &h.lender,
            &h.borrower,
            LoanTerms::new(Amount::new(100), Amount::new(300), 2),
        )
        .unwrap();
    h.pay_installments(loan_id, 1);

    let nothing_owed = LendingError::Precondition(PreconditionError::NothingOwed(loan_id));
    assert_eq!(h.engine.quote_early_payoff(loan_id).unwrap_err(), nothing_owed);
    assert_eq!(
        h.engine
            .pay_early(&h.borrower, loan_id, Amount::ZERO)
            .unwrap_err(),
        nothing_owed
    );

    // Still payable on schedule
    assert!(h.engine.get_loan(loan_id).active);
    h.pay_installments(loan_id, 1);
    assert!(!h.engine.get_loan(loan_id).active);
}

#[test]
fn test_scenario_c_same_address_both_roles() {
    let h = Harness::new();
    let carol = Address::new("carol");
    h.engine.register_lender(&carol);
    h.engine.register_borrower(&carol);

    assert!(h.engine.is_lender(&carol));
    assert!(h.engine.is_borrower(&carol));
}

#[test]
fn test_scenario_d_off_by_one_installment_rejected() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();

    for wrong in [219, 221] {
        let err = h
            .engine
            .pay_installment(&h.borrower, loan_id, Amount::new(wrong))
            .unwrap_err();
        assert!(matches!(
            err,
            LendingError::Precondition(PreconditionError::PaymentMismatch { .. })
        ));
    }

    let loan = h.engine.get_loan(loan_id);
    assert_eq!(loan.installments_paid, 0);
    assert_eq!(loan.total_paid, Amount::ZERO);
    assert_eq!(h.engine.treasury_balance(), Amount::new(4000));
}

#[test]
fn test_scenario_e_fee_cap() {
    let h = Harness::new();

    let err = h.engine.set_platform_fee(&h.admin, 1001).unwrap_err();
    assert_eq!(
        err,
        LendingError::Precondition(PreconditionError::FeeAboveCap {
            requested: 1001,
            cap: 1000,
        })
    );

    h.engine.set_platform_fee(&h.admin, 1000).unwrap();
    assert_eq!(h.engine.platform_fee(), FeeBps::MAX);
    assert!(h.env.events.events().contains(&LoanEvent::FeeUpdated {
        old: FeeBps::DEFAULT,
        new: FeeBps::MAX,
    }));
}

#[test]
fn test_fee_change_applies_at_settlement() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.pay_installments(loan_id, 4);
    h.engine.set_platform_fee(&h.admin, 1000).unwrap();
    h.pay_installments(loan_id, 1);

    // 10% of 100 interest
    assert_eq!(h.engine.accrued_fees(), Amount::new(10));
    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(4000 + 1090));
}

#[test]
fn test_completed_loan_rejects_further_payments() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.pay_installments(loan_id, 5);
    let lender_balance = h.engine.balance_of(&h.lender);

    let not_active = LendingError::Precondition(PreconditionError::LoanNotActive(loan_id));
    assert_eq!(
        h.engine
            .pay_installment(&h.borrower, loan_id, Amount::new(220))
            .unwrap_err(),
        not_active
    );
    assert_eq!(
        h.engine
            .pay_early(&h.borrower, loan_id, Amount::new(1))
            .unwrap_err(),
        not_active
    );
    assert!(h.engine.quote_early_payoff(loan_id).is_err());

    // Settlement happened exactly once
    assert_eq!(h.engine.balance_of(&h.lender), lender_balance);
    let completions = h
        .env
        .events
        .for_loan(loan_id)
        .into_iter()
        .filter(|e| matches!(e, LoanEvent::LoanCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
}

#[test]
fn test_only_borrower_may_pay() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    let mallory = Address::new("mallory");

    let err = h
        .engine
        .pay_installment(&mallory, loan_id, Amount::new(220))
        .unwrap_err();
    assert_eq!(
        err,
        LendingError::Auth(AuthError::NotBorrower {
            loan_id,
            caller: mallory.clone(),
        })
    );
    assert!(h
        .engine
        .pay_early(&mallory, loan_id, Amount::new(1003))
        .unwrap_err()
        .is_authorization());
}

#[test]
fn test_create_loan_preconditions() {
    let h = Harness::new();
    let stranger = Address::new("stranger");
    let terms = Harness::scenario_terms();

    let cases = [
        (
            h.engine.create_loan(&h.lender, &h.lender, &h.borrower, terms),
            LendingError::Auth(AuthError::NotAdmin {
                caller: h.lender.clone(),
            }),
        ),
        (
            h.engine.create_loan(&h.admin, &stranger, &h.borrower, terms),
            LendingError::Precondition(PreconditionError::LenderNotRegistered(stranger.clone())),
        ),
        (
            h.engine.create_loan(&h.admin, &h.lender, &stranger, terms),
            LendingError::Precondition(PreconditionError::BorrowerNotRegistered(stranger.clone())),
        ),
        (
            h.engine.create_loan(
                &h.admin,
                &h.lender,
                &h.borrower,
                LoanTerms::new(Amount::new(5001), Amount::new(1), 1),
            ),
            LendingError::Precondition(PreconditionError::InsufficientCredit {
                required: Amount::new(5001),
                available: Amount::new(5000),
            }),
        ),
        (
            h.engine.create_loan(
                &h.admin,
                &h.lender,
                &h.borrower,
                LoanTerms::new(Amount::new(1000), Amount::new(100), 0),
            ),
            LendingError::Precondition(PreconditionError::ZeroInstallments),
        ),
    ];

    for (result, expected) in cases {
        assert_eq!(result.unwrap_err(), expected);
    }

    assert_eq!(h.engine.loan_count(), 0);
    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(5000));
    assert_eq!(h.engine.treasury_balance(), Amount::new(5000));
    assert!(h.env.certificates.is_empty());
}

#[test]
fn test_installments_with_rounding_loss() {
    let h = Harness::new();
    let loan_id = h
        .engine
        .create_loan(
            &h.admin,
            &h.lender,
            &h.borrower,
            LoanTerms::new(Amount::new(1000), Amount::new(1), 3),
        )
        .unwrap();

    // 1001 / 3 = 333, 3 * 333 = 999 < 1000 principal
    h.pay_installments(loan_id, 3);
    let loan = h.engine.get_loan(loan_id);
    assert!(!loan.active);
    assert_eq!(loan.total_paid, Amount::new(999));
    assert_eq!(h.engine.accrued_fees(), Amount::ZERO);
    assert_eq!(h.engine.balance_of(&h.lender), Amount::new(4000 + 999));
}

#[test]
fn test_emergency_withdrawal_leaves_loans_untouched() {
    let h = Harness::new();
    let loan_id = h.create_scenario_loan();
    h.pay_installments(loan_id, 2);

    let drained = h.engine.emergency_withdraw(&h.admin).unwrap();
    assert_eq!(drained, Amount::new(4440));
    assert_eq!(h.engine.treasury_balance(), Amount::ZERO);
    assert_eq!(h.env.bank.received_by(&h.admin), Amount::new(4440));

    let loan = h.engine.get_loan(loan_id);
    assert!(loan.active);
    assert_eq!(loan.installments_paid, 2);
    h.pay_installments(loan_id, 3);
    assert!(!h.engine.get_loan(loan_id).active);
}
