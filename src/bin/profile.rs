use corridors::{Error, app::App, config::Config, logging};

fn main() -> Result<(), Error> {
    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(1);
    // Remaining arguments are the usual [width] [depth] [seed]
    let config = Config::from_args(args)?.with_env(|key| std::env::var(key).ok())?;
    config.validate()?;

    let _log_guard = logging::init(&config)?;
    App::new(config).profile(num_iters)
}
