use causal_chain_models::{
    BootstrapOptions, ChainSimulationOptions, Estimator, bootstrap_ate, simulate_chain,
};

fn main() {
    let data = simulate_chain(ChainSimulationOptions {
        n: 5_000,
        seed: 11,
        confounded: true,
        ..ChainSimulationOptions::default()
    })
    .expect("simulate")
    .data;

    let options = BootstrapOptions {
        iterations: 200,
        seed: 11,
        ..BootstrapOptions::default()
    };
    for estimator in Estimator::ALL {
        let summary = bootstrap_ate(estimator, &data, options).expect("bootstrap");
        println!(
            "{estimator:<26} ate {:+.4}  se {:.4}  95% CI [{:+.4}, {:+.4}]",
            summary.estimate,
            summary.standard_error,
            summary.percentile_ci.lower,
            summary.percentile_ci.upper
        );
    }
}
