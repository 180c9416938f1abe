use corridors::{
    Error,
    app::{App, RunOutcome},
    config::Config,
    logging,
};

fn main() -> Result<(), Error> {
    let config = Config::load()?;
    let _log_guard = logging::init(&config)?;
    tracing::info!(?config, "starting");

    let app = App::new(config);
    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let outcome = app.run();
    App::restore_terminal(&mut stdout)?;

    match &outcome {
        Ok(RunOutcome::Completed) => tracing::info!("maze finished"),
        Ok(RunOutcome::Cancelled) => println!("Generation cancelled."),
        Ok(RunOutcome::TooSmall) => println!(
            "Terminal too small for a {}x{} maze.",
            app.config().width,
            app.config().depth
        ),
        Err(e) => tracing::error!(error = %e, "run failed"),
    }
    outcome.map(|_| ())
}
