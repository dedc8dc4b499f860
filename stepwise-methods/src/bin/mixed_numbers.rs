//! Adds `[5 1/4] + [2 2/3]` in the US and EU curricula and prints the steps.
//!
//! The strategy can be chosen by name with the first argument; it defaults to `AddMixedNumbers`.
//! Set `RUST_LOG=debug` to see which alternatives are selected.

use stepwise_engine::{
    context::{Context, Preset},
    error::Error,
    expr::{Expression, Subexpression},
    primitive::int,
};
use stepwise_methods::registry::REGISTRY;
use tracing_subscriber::EnvFilter;

fn run(name: &str) -> Result<(), Error> {
    let method = REGISTRY.get(name)?;
    let sum = Expression::sum(vec![
        Expression::mixed_number(int(5), int(1), int(4))?,
        Expression::mixed_number(int(2), int(2), int(3))?,
    ])?;
    let sub = Subexpression::root(sum);
    tracing::info!(strategy = %name, expression = %sub.expr, "running strategy");

    for (label, preset) in [("US", Preset::UsCurriculum), ("EU", Preset::EuCurriculum)] {
        let ctx = Context::new().with_preset(preset);
        match method.try_execute(&ctx, &sub)? {
            Some(transformation) => println!("{}:\n{}", label, transformation),
            None => println!("{}: {} does not apply to {}", label, method.name(), sub.expr),
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "AddMixedNumbers".to_string());
    if let Err(err) = run(&name) {
        let report = err.into_report(vec![0..name.len()]).render("strategy", &name);
        eprint!("{}", report);
        std::process::exit(1);
    }
}
