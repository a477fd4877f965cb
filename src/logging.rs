use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Inicializa o subscriber global.
///
/// Nível padrão `vendas_etl=info`, sobrescrito por `RUST_LOG`. Com `json`,
/// cada evento sai como uma linha JSON (útil quando o job roda agendado).
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vendas_etl=info"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
