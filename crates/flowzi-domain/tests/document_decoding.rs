use flowzi_domain::{
    AllocationProfile, Bill, Goal, IncomeFrequency, SymbolPosition, Theme, Transaction,
    TransactionKind, TransactionType, UserSettings,
};

#[test]
fn partial_settings_document_uses_defaults() {
    let settings: UserSettings =
        serde_json::from_str(r#"{"monthlyIncome": 2500}"#).expect("decode settings");

    assert_eq!(settings.monthly_income, 2500.0);
    assert_eq!(settings.currency, "USD");
    assert!(settings.show_cents);
    assert_eq!(settings.symbol_position, SymbolPosition::Before);
    assert_eq!(settings.income_frequency, IncomeFrequency::Monthly);
    assert_eq!(settings.theme, Theme::Light);
}

#[test]
fn unrecognised_symbol_position_renders_after() {
    let settings: UserSettings =
        serde_json::from_str(r#"{"symbolPosition": "trailing", "theme": "dark"}"#)
            .expect("decode settings");

    assert_eq!(settings.symbol_position, SymbolPosition::After);
    assert_eq!(settings.theme, Theme::Dark);
}

#[test]
fn transaction_document_uses_camel_case_fields() {
    let txn: Transaction = serde_json::from_str(
        r#"{
            "id": "t1",
            "category": "Freelance",
            "amount": 300.5,
            "date": "2025-04-01",
            "note": "invoice 12",
            "type": "Income",
            "transactionType": "Side Income"
        }"#,
    )
    .expect("decode transaction");

    assert_eq!(txn.id, "t1");
    assert_eq!(txn.kind, TransactionKind::Income);
    assert_eq!(txn.transaction_type, TransactionType::SideIncome);

    let value = serde_json::to_value(&txn).expect("encode transaction");
    assert_eq!(value["transactionType"], "Side Income");
    assert_eq!(value["type"], "Income");
}

#[test]
fn goal_and_bill_documents_decode() {
    let goal: Goal = serde_json::from_str(
        r#"{"name":"Trip","category":"Trip","targetAmount":500,"timeframe":5,"createdAt":"2025-01-01T10:00:00Z"}"#,
    )
    .expect("decode goal");
    assert_eq!(goal.target_amount, 500.0);
    assert!(goal.created_at.is_some());

    let bill: Bill =
        serde_json::from_str(r#"{"name":"Power","amount":80,"days":9}"#).expect("decode bill");
    assert_eq!(bill.days, 9);
    assert_eq!(bill.id, "");
}

#[test]
fn income_frequency_scales_to_monthly() {
    assert_eq!(IncomeFrequency::Weekly.to_monthly(500.0), 2000.0);
    assert_eq!(IncomeFrequency::Yearly.to_monthly(1200.0), 100.0);
    assert_eq!(IncomeFrequency::Monthly.to_monthly(42.0), 42.0);
}

#[test]
fn builtin_profiles_keep_table_order() {
    let dashboard = AllocationProfile::dashboard();
    let names: Vec<&str> = dashboard
        .allocations
        .iter()
        .map(|line| line.category.as_str())
        .collect();
    assert_eq!(names, vec!["Rent", "Food", "Dining Out", "Transport"]);

    let goals = AllocationProfile::goals();
    let total: f64 = goals.allocations.iter().map(|line| line.share).sum();
    assert!((total - 1.0).abs() < 1e-9);
}
