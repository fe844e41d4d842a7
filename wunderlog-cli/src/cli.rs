use anyhow::Context;
use clap::Parser;
use wunderlog_core::{Config, Wunderlog};

/// Collect observations and forecast data from Weather Underground.
#[derive(Debug, Parser)]
#[command(name = "wunderlog", version, about)]
pub struct Cli {
    /// The location, e.g. Norway/Asker
    pub location: String,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let options = config.options()?;
        tracing::debug!("Writing under {}", options.directory.display());

        let wlog = Wunderlog::new(&self.location, options)
            .await
            .with_context(|| format!("Failed to set up collection for {}", self.location))?;
        wlog.collect()
            .await
            .with_context(|| format!("Collection failed for {}", self.location))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn location_is_required() {
        assert!(Cli::try_parse_from(["wunderlog"]).is_err());

        let cli = Cli::try_parse_from(["wunderlog", "Norway/Asker"]).unwrap();
        assert_eq!(cli.location, "Norway/Asker");
    }

    #[test]
    fn no_extra_flags() {
        assert!(Cli::try_parse_from(["wunderlog", "Norway/Asker", "--kind", "hourly"]).is_err());
    }
}
