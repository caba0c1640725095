use causal_chain_models::{
    ChainParameters, ChainSimulationOptions, EmOptions, fit_chain_missing_mediator,
    mask_mediator, missing_as_zero_ate, simulate_chain,
};

fn confounded_sample() -> causal_chain_models::ChainDataset {
    simulate_chain(ChainSimulationOptions {
        n: 20_000,
        seed: 7,
        confounded: true,
        ..ChainSimulationOptions::default()
    })
    .expect("simulate")
    .data
}

#[test]
fn no_missingness_returns_empirical_parameters() {
    let data = confounded_sample();
    let (params, report) = fit_chain_missing_mediator(&data, EmOptions::default()).expect("em");
    let empirical = ChainParameters::from_empirical(&data);
    for ((name, fitted), (_, expected)) in params.entries().into_iter().zip(empirical.entries()) {
        assert!((fitted - expected).abs() < 1e-12, "{name}: {fitted} vs {expected}");
    }
    assert!(report.converged);
    assert_eq!(report.missing_mediator, 0);
}

#[test]
fn em_recovers_masked_mediator_better_than_zero_imputation() {
    let data = confounded_sample();
    let oracle = ChainParameters::from_empirical(&data).ate();
    let masked = mask_mediator(&data, 0.25, 7).expect("mask");
    assert_eq!(masked.n_missing_mediator(), 5_000);

    let options = EmOptions {
        max_iter: 200,
        tolerance: 1e-7,
        seed: 7,
    };
    let (params, report) = fit_chain_missing_mediator(&masked, options).expect("em");
    assert!(report.iterations <= 200);
    assert!(params.validate().is_ok());
    for (_, value) in params.entries() {
        assert!((0.0..=1.0).contains(&value));
    }

    let em_bias = (params.ate() - oracle).abs();
    let zero_bias = (missing_as_zero_ate(&masked) - oracle).abs();
    assert!(em_bias < zero_bias, "em {em_bias} vs zero {zero_bias}");
    assert!(em_bias < 0.02);
}

#[test]
fn em_is_deterministic_for_a_dataset() {
    let masked = mask_mediator(&confounded_sample(), 0.4, 1).expect("mask");
    let (first, first_report) =
        fit_chain_missing_mediator(&masked, EmOptions::default()).expect("em");
    let (second, second_report) =
        fit_chain_missing_mediator(&masked, EmOptions::default()).expect("em");
    assert_eq!(first, second);
    assert_eq!(
        first_report.log_likelihood_trace,
        second_report.log_likelihood_trace
    );
}
