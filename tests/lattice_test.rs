// tests/lattice_test.rs
use approx::assert_abs_diff_eq;
use early_exercise::analytics::bs_analytic;
use early_exercise::{
    BinomialEngine, ExerciseStyle, LatticeConfig, MarketData, OptionType, PricingEngine,
    PricingError, TrinomialEngine, VanillaOption,
};

fn atm_market() -> MarketData {
    MarketData::new(100.0, 0.05, 0.2, 0.0).expect("valid market")
}

fn engines(steps: usize) -> Vec<Box<dyn PricingEngine>> {
    vec![
        Box::new(BinomialEngine::new(steps).expect("valid steps")),
        Box::new(TrinomialEngine::new(steps).expect("valid steps")),
    ]
}

#[test]
fn test_european_convergence_to_closed_form() {
    let market = atm_market();
    for option_type in [OptionType::Call, OptionType::Put] {
        let option = VanillaOption::european(100.0, 1.0, option_type).unwrap();
        let analytic = bs_analytic::european_price(&option, &market);

        for engine_at in [0, 1] {
            let errors: Vec<f64> = [50, 100, 200, 500]
                .iter()
                .map(|&n| {
                    let engine = &engines(n)[engine_at];
                    (engine.price(&option, &market).unwrap() - analytic).abs()
                })
                .collect();

            println!("{} {} errors: {:?}", engines(1)[engine_at].name(), option_type, errors);
            assert!(errors.windows(2).all(|w| w[1] < w[0]), "non-monotone: {:?}", errors);
            assert!(errors[3] < 0.1);
            assert!(errors[3] < 0.01);
        }
    }
}

#[test]
fn test_american_at_least_european() {
    let market = atm_market();
    for engine in engines(200) {
        for option_type in [OptionType::Call, OptionType::Put] {
            for strike in [80.0, 100.0, 120.0] {
                let american = VanillaOption::american(strike, 1.0, option_type).unwrap();
                let european = american.with_style(ExerciseStyle::European);

                let a = engine.price(&american, &market).unwrap();
                let e = engine.price(&european, &market).unwrap();
                assert!(a >= e - 1e-10, "{} K={} {}: {} < {}", engine.name(), strike, option_type, a, e);
                assert!(a >= american.payoff(market.spot()) - 1e-10);
            }
        }
    }
}

#[test]
fn test_call_without_dividends_has_no_premium() {
    let market = atm_market();
    let american = VanillaOption::american(100.0, 1.0, OptionType::Call).unwrap();
    let european = american.with_style(ExerciseStyle::European);

    for engine in engines(200) {
        let a = engine.price(&american, &market).unwrap();
        let e = engine.price(&european, &market).unwrap();
        assert_abs_diff_eq!(a, e, epsilon = 1e-9);
    }
}

#[test]
fn test_dividends_create_call_premium() {
    let market = MarketData::new(100.0, 0.05, 0.2, 0.08).unwrap();
    let call = VanillaOption::american(100.0, 1.0, OptionType::Call).unwrap();
    let european = bs_analytic::european_price(&call, &market);

    let american = BinomialEngine::new(200).unwrap().price(&call, &market).unwrap();
    assert!(american > european + 0.3, "{} vs {}", american, european);
}

#[test]
fn test_american_put_reference_value() {
    // Longstaff-Schwartz (2001) Table 1, first row: finite-difference value 4.478
    let market = MarketData::new(36.0, 0.06, 0.2, 0.0).unwrap();
    let put = VanillaOption::american(40.0, 1.0, OptionType::Put).unwrap();

    let binomial = BinomialEngine::new(1000).unwrap().price(&put, &market).unwrap();
    let trinomial = TrinomialEngine::new(1000).unwrap().price(&put, &market).unwrap();

    assert_abs_diff_eq!(binomial, 4.4868, epsilon = 0.005);
    assert_abs_diff_eq!(trinomial, 4.4868, epsilon = 0.005);
}

#[test]
fn test_unrepresentable_market_is_rejected() {
    // e^{rΔt} > u, so the up probability exceeds one
    let market = MarketData::new(100.0, 0.9, 0.01, 0.0).unwrap();
    let put = VanillaOption::american(100.0, 1.0, OptionType::Put).unwrap();

    let err = BinomialEngine::new(1).unwrap().price(&put, &market).unwrap_err();
    assert!(matches!(err, PricingError::InvalidProbability { .. }), "{:?}", err);
}

#[test]
fn test_unrepresentable_trinomial_is_rejected() {
    // drift per step dwarfs the node spacing, so p_u leaves [0, 1]
    let market = MarketData::new(100.0, 1.0, 0.05, 0.0).unwrap();
    let put = VanillaOption::american(100.0, 1.0, OptionType::Put).unwrap();

    let err = TrinomialEngine::new(1).unwrap().price(&put, &market).unwrap_err();
    match err {
        PricingError::InvalidProbability { lattice, branch, value } => {
            assert_eq!(lattice, "trinomial");
            assert_eq!(branch, "pu");
            assert!(value > 1.0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_lattice_config() {
    let config: LatticeConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.steps, 100);

    let engine = TrinomialEngine::from_config(&config).unwrap();
    assert_eq!(engine.steps(), 100);

    assert!(BinomialEngine::from_config(&LatticeConfig { steps: 0 }).is_err());
}
