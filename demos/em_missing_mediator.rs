use causal_chain_models::{
    ChainParameters, ChainSimulationOptions, EmOptions, fit_chain_missing_mediator,
    mask_mediator, missing_as_zero_ate, render_parameter_table, simulate_chain,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data = simulate_chain(ChainSimulationOptions {
        n: 20_000,
        seed: 7,
        confounded: true,
        ..ChainSimulationOptions::default()
    })
    .expect("simulate")
    .data;
    let oracle = ChainParameters::from_empirical(&data);

    for frac in [0.1, 0.25, 0.5] {
        let masked = mask_mediator(&data, frac, 7).expect("mask");
        let options = EmOptions {
            max_iter: 200,
            tolerance: 1e-7,
            seed: 7,
        };
        let (params, report) = fit_chain_missing_mediator(&masked, options).expect("em");
        println!(
            "missing {:.0}%: EM ate {:+.4}, missing-as-zero ate {:+.4}, oracle {:+.4} ({} iterations)",
            frac * 100.0,
            params.ate(),
            missing_as_zero_ate(&masked),
            oracle.ate(),
            report.iterations
        );
        println!("{}", render_parameter_table(&params));
    }
}
