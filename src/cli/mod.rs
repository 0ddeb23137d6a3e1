use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "mashupgen",
    about = "Mashup Generator - search YouTube for an artist, trim and merge the audio, and email the result",
    version,
    long_about = "Searches YouTube for an artist's songs, downloads the audio of the top results, \
trims each clip to a fixed duration, concatenates them into one mashup, zips it, and emails it \
to the recipient."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a mashup and email it
    Generate {
        /// Artist or singer to search for
        #[arg(value_name = "ARTIST")]
        artist: String,

        /// Number of videos to include (must be greater than 10)
        #[arg(short = 'n', long, value_name = "COUNT",
              value_parser = clap::value_parser!(u32).range(11..))]
        videos: u32,

        /// Seconds to keep from each clip (must be greater than 20)
        #[arg(short, long, value_name = "SECONDS",
              value_parser = clap::value_parser!(u32).range(21..))]
        duration: u32,

        /// Recipient email address
        #[arg(short, long, value_name = "EMAIL")]
        email: String,
    },

    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_generate_parses() {
        let cli = parse(&[
            "mashupgen", "generate", "Test Artist", "-n", "11", "-d", "21", "-e",
            "user@example.com",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                artist,
                videos,
                duration,
                email,
            } => {
                assert_eq!(artist, "Test Artist");
                assert_eq!(videos, 11);
                assert_eq!(duration, 21);
                assert_eq!(email, "user@example.com");
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_widget_bounds_enforced() {
        // The input widgets reject out-of-range numbers before the core
        // ever sees them.
        let err = parse(&[
            "mashupgen", "generate", "A", "-n", "10", "-d", "21", "-e", "u@e.com",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = parse(&[
            "mashupgen", "generate", "A", "-n", "11", "-d", "20", "-e", "u@e.com",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
