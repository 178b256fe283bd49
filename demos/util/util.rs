use anyhow::Context;

pub fn init(exe: &str) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{exe}=trace,eager_deferred=trace")));

    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .finish(),
    )
    .context("Failed to set global tracing subscriber")?;

    Ok(())
}
