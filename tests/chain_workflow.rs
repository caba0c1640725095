use causal_chain_models::{
    ChainParameters, ChainSimulationOptions, Estimator, TreatmentLevel, ate, estimate_effect,
    simulate_chain, true_do_from_dgp_chain,
};

fn simulated(confounded: bool, seed: u64) -> causal_chain_models::ChainDataset {
    simulate_chain(ChainSimulationOptions {
        n: 20_000,
        seed,
        confounded,
        ..ChainSimulationOptions::default()
    })
    .expect("simulate")
    .data
}

#[test]
fn unconfounded_estimators_agree_with_oracle() {
    let data = simulated(false, 3);
    let oracle = ChainParameters::from_empirical(&data).ate();
    for estimator in Estimator::ALL {
        let estimate = ate(estimator, &data);
        assert!(
            (estimate - oracle).abs() < 0.03,
            "{estimator}: {estimate} vs oracle {oracle}"
        );
    }
}

#[test]
fn plugin_matches_oracle_exactly() {
    let data = simulated(true, 4);
    let params = ChainParameters::from_empirical(&data);
    for level in TreatmentLevel::ALL {
        let plugin = Estimator::PluginBackdoorChain.interventional_mean(&data, level);
        assert!((plugin - true_do_from_dgp_chain(&params, level)).abs() < 1e-12);
    }
}

#[test]
fn frontdoor_beats_naive_under_confounding() {
    let options = ChainSimulationOptions {
        n: 20_000,
        seed: 5,
        confounded: true,
        ..ChainSimulationOptions::default()
    };
    let data = simulate_chain(options).expect("simulate").data;
    let structural = options.coefficients.ate(true);
    let oracle = ChainParameters::from_empirical(&data).ate();

    let naive = ate(Estimator::Naive, &data);
    let frontdoor = ate(Estimator::FrontDoor, &data);

    assert!((frontdoor - structural).abs() < (naive - structural).abs());
    assert!((frontdoor - oracle).abs() < (naive - oracle).abs());
    assert!((frontdoor - structural).abs() < 0.03);
}

#[test]
fn repeated_estimates_are_identical() {
    let data = simulated(true, 6);
    for estimator in Estimator::ALL {
        let first = estimate_effect(estimator, &data);
        let second = estimate_effect(estimator, &data);
        assert_eq!(
            first.additive_effect.to_bits(),
            second.additive_effect.to_bits()
        );
        assert!((0.0..=1.0).contains(&first.mean_treated));
        assert!((0.0..=1.0).contains(&first.mean_untreated));
    }
}

#[test]
fn estimator_identifiers_round_trip_through_parsing() {
    for estimator in Estimator::ALL {
        let parsed: Estimator = estimator.id().parse().expect("known identifier");
        assert_eq!(parsed, estimator);
    }
    assert!("backdoor".parse::<Estimator>().is_err());
}
