// tests/property_test.rs
use early_exercise::{
    BinomialEngine, ExerciseStyle, MarketData, OptionType, PricingEngine, TrinomialEngine,
    VanillaOption,
};
use proptest::prelude::*;

fn option_type() -> impl Strategy<Value = OptionType> {
    prop_oneof![Just(OptionType::Call), Just(OptionType::Put)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn american_dominates_european_and_intrinsic(
        spot in 50.0f64..150.0,
        strike in 50.0f64..150.0,
        rate in 0.0f64..0.1,
        vol in 0.1f64..0.6,
        dividend in 0.0f64..0.05,
        expiry in 0.1f64..2.0,
        option_type in option_type(),
        steps in 10usize..120,
    ) {
        let market = MarketData::new(spot, rate, vol, dividend).unwrap();
        let american = VanillaOption::american(strike, expiry, option_type).unwrap();
        let european = american.with_style(ExerciseStyle::European);
        let intrinsic = american.payoff(spot);

        let engines: [Box<dyn PricingEngine>; 2] = [
            Box::new(BinomialEngine::new(steps).unwrap()),
            Box::new(TrinomialEngine::new(steps).unwrap()),
        ];
        for engine in &engines {
            let a = engine.price(&american, &market).unwrap();
            let e = engine.price(&european, &market).unwrap();
            prop_assert!(a >= e - 1e-10, "{}: {} < {}", engine.name(), a, e);
            prop_assert!(a >= intrinsic - 1e-10, "{}: {} < {}", engine.name(), a, intrinsic);
            prop_assert!(e >= 0.0);
        }
    }
}
