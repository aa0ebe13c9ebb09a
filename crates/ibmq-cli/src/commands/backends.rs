//! Backends command implementation.

use anyhow::Result;
use console::style;

use ibmq_account::BackendFilter;

use super::common::{load_provider, spinner};
use crate::ProviderSelector;

/// Execute the backends command.
///
/// `simulator` restricts the listing to simulators (`Some(true)`) or
/// devices (`Some(false)`).
pub async fn execute(
    selector: &ProviderSelector,
    simulator: Option<bool>,
    operational: bool,
) -> Result<()> {
    let (_factory, provider) = load_provider(selector).await?;

    let mut filter = BackendFilter::any();
    if let Some(simulator) = simulator {
        filter = filter.simulator(simulator);
    }
    if operational {
        filter = filter.operational(true);
    }

    let spinner = spinner("Fetching backends...");
    let backends = provider.backends(&filter).await;
    spinner.finish_and_clear();
    let backends = backends?;

    println!(
        "{} Backends of {}:\n",
        style("→").cyan().bold(),
        style(provider.key()).green()
    );

    if backends.is_empty() {
        println!("  No backends found.");
        return Ok(());
    }

    for backend in &backends {
        let config = backend.configuration();
        println!(
            "  {} {} {}",
            style("●").cyan(),
            style(backend.name()).bold(),
            if config.simulator { "(simulator)" } else { "" }
        );
        println!("    Qubits: {}", config.n_qubits);
        if let Some(max_shots) = config.max_shots {
            println!("    Max shots: {max_shots}");
        }
        if !config.basis_gates.is_empty() {
            println!("    Gates: {}", config.basis_gates.join(", "));
        }
    }

    let aliases = provider.aliased_backend_names();
    let available: Vec<_> = aliases
        .pairs()
        .into_iter()
        .filter(|(_, target)| backends.iter().any(|b| b.name() == *target))
        .collect();
    if !available.is_empty() {
        println!("\n  Aliases:");
        for (alias, target) in available {
            println!("    {} → {}", style(alias).dim(), target);
        }
    }

    Ok(())
}
