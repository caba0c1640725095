use causal_chain_models::{
    ExperimentOptions, render_experiment_table, render_parameter_table, run_chain_experiment,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    for confounded in [false, true] {
        let options = ExperimentOptions {
            confounded,
            ..ExperimentOptions::default()
        };
        let report = run_chain_experiment(options).expect("experiment");
        println!(
            "confounded = {confounded}, n = {}, masked = {}",
            report.diagnostics.n_rows, report.masked_diagnostics.n_mediator_missing
        );
        println!("{}", render_experiment_table(&report));
        println!("{}", render_parameter_table(&report.em_parameters));
        println!(
            "EM iterations: {}, converged: {}\n",
            report.em_report.iterations, report.em_report.converged
        );
    }
}
