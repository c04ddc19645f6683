use carbon_snapshot::calculator::ColumnIndex;
use carbon_snapshot::FootprintCalculator;
use proptest::prelude::*;
use proptest::test_runner::Config;

const ACTIVITIES: &[&str] = &[
    "electricity",
    "Natural Gas",
    "diesel",
    "flights",
    "Hotel Stays",
    "office waste",
    "Team Travel",
    "Cloud Services",
    "refrigerants",
    "mystery item",
];

fn row_strategy() -> impl Strategy<Value = Vec<String>> {
    (
        prop::sample::select(ACTIVITIES),
        prop_oneof![
            4 => (-1_000.0_f64..100_000.0).prop_map(|q| format!("{q:.3}")),
            1 => Just("abc".to_string()),
            1 => Just(String::new()),
        ],
        prop::sample::select(&["kWh", "km", "kg", ""][..]),
    )
        .prop_map(|(a, q, u)| vec![a.to_string(), q, u.to_string()])
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn totals_agree_with_breakdowns(rows in prop::collection::vec(row_strategy(), 1..40)) {
        let calc = FootprintCalculator::default();
        let Ok(result) = calc.compute(&["Activity", "Quantity", "Unit"], &rows[..]) else {
            return Ok(());
        };

        let detailed: f64 = result.detailed.iter().map(|r| r.co2e).sum();
        let by_scope: f64 = result.by_scope.iter().map(|s| s.value).sum();
        let by_category: f64 = result.by_category.iter().map(|s| s.value).sum();

        prop_assert!((result.total_co2e - detailed).abs() <= 0.01);
        prop_assert!((result.total_co2e - by_scope).abs() <= 0.01);
        prop_assert!((result.total_co2e - by_category).abs() <= 0.01);
    }

    #[test]
    fn compute_is_deterministic(rows in prop::collection::vec(row_strategy(), 0..20)) {
        let calc = FootprintCalculator::default();
        let header = ["activity", "quantity", "unit"];
        let first = calc.compute(&header, &rows[..]).map(|r| r.to_json().unwrap());
        let second = calc.compute(&header, &rows[..]).map(|r| r.to_json().unwrap());
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "outcomes differ between runs"),
        }
    }

    #[test]
    fn header_resolution_ignores_order_case_and_padding(
        order in Just(vec![0usize, 1, 2]).prop_shuffle(),
        upper in any::<bool>(),
        pad in 0usize..3,
    ) {
        let names = ["activity", "quantity", "unit"];
        let header: Vec<String> = order
            .iter()
            .map(|&i| {
                let name = if upper { names[i].to_uppercase() } else { names[i].to_string() };
                format!("{}{}{}", " ".repeat(pad), name, " ".repeat(pad))
            })
            .collect();

        let index = ColumnIndex::resolve(&header[..]).unwrap();
        let position = |i: usize| order.iter().position(|&o| o == i).unwrap();
        prop_assert_eq!(index.activity, position(0));
        prop_assert_eq!(index.quantity, position(1));
        prop_assert_eq!(index.unit, position(2));
    }
}
