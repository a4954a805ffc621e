use std::path::PathBuf;

use calforge_core::config::CalendarConfig;
use calforge_core::constants::DEFAULT_OUTPUT_FILE;
use calforge_service::calendar::{EmitOptions, TextEscaping};
use calforge_service::local_tz::{FixedLocalTimezone, LocalTimezoneProvider, SystemLocalTimezone};
use clap::Parser;

/// Path value meaning standard input or output.
pub const STDIO_PATH: &str = "-";

/// Convert JSON event descriptors into an iCalendar (.ics) file.
#[derive(Debug, Parser)]
#[command(name = "calforge", version, about)]
pub struct Cli {
    /// JSON input: an array of events or an object with an `events` array.
    /// Reads standard input when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Where to write the calendar; `-` writes to standard output.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Configuration file, instead of `calforge.toml` in the working directory.
    #[arg(short, long, env = "CALFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Timezone for events that name none, overriding configuration and
    /// host detection.
    #[arg(long, value_name = "TZID")]
    pub timezone: Option<String>,

    /// Product identifier for the `PRODID` line.
    #[arg(long, value_name = "ID", allow_hyphen_values = true)]
    pub prodid: Option<String>,

    /// Escape text values per RFC 5545.
    #[arg(long)]
    pub escape_text: bool,

    /// Fold content lines longer than 75 octets.
    #[arg(long)]
    pub fold_lines: bool,
}

impl Cli {
    /// Emission settings: configuration first, command-line flags on top.
    #[must_use]
    pub fn emit_options(&self, config: &CalendarConfig) -> EmitOptions {
        let mut options = EmitOptions::from(config);
        if let Some(prodid) = &self.prodid {
            options.product_id.clone_from(prodid);
        }
        if self.escape_text {
            options.text_escaping = TextEscaping::Rfc5545;
        }
        options.fold_lines |= self.fold_lines;
        options
    }

    /// Local timezone source: `--timezone`, then configuration, then the host.
    #[must_use]
    pub fn local_timezone(&self, config: &CalendarConfig) -> Box<dyn LocalTimezoneProvider> {
        match self.timezone.as_ref().or(config.local_timezone.as_ref()) {
            Some(tzid) => Box::new(FixedLocalTimezone::new(tzid.trim())),
            None => Box::new(SystemLocalTimezone),
        }
    }

    /// The input path, or `None` for standard input.
    #[must_use]
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != STDIO_PATH)
    }

    /// The output path, or `None` for standard output.
    #[must_use]
    pub fn output_path(&self) -> Option<&PathBuf> {
        (self.output.as_os_str() != STDIO_PATH).then_some(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CalendarConfig {
        CalendarConfig {
            product_id: "-//Config//Calendar//EN".to_string(),
            local_timezone: Some("Europe/Berlin".to_string()),
            escape_text: false,
            fold_lines: true,
            uid_namespace: None,
        }
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("calforge").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test_log::test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.input_path(), None);
        assert_eq!(cli.output_path(), Some(&PathBuf::from(DEFAULT_OUTPUT_FILE)));
        assert!(!cli.escape_text);
    }

    #[test_log::test]
    fn dash_means_stdio() {
        let cli = parse(&["-", "--output", "-"]);
        assert_eq!(cli.input_path(), None);
        assert_eq!(cli.output_path(), None);

        let cli = parse(&["events.json", "-o", "out.ics"]);
        assert_eq!(cli.input_path(), Some(&PathBuf::from("events.json")));
        assert_eq!(cli.output_path(), Some(&PathBuf::from("out.ics")));
    }

    #[test_log::test]
    fn flags_override_config() {
        let cli = parse(&["--prodid", "-//Flag//EN", "--escape-text"]);
        let options = cli.emit_options(&config());

        assert_eq!(options.product_id, "-//Flag//EN");
        assert_eq!(options.text_escaping, TextEscaping::Rfc5545);
        assert!(options.fold_lines);
    }

    #[test_log::test]
    fn config_applies_without_flags() {
        let options = parse(&[]).emit_options(&config());
        assert_eq!(options.product_id, "-//Config//Calendar//EN");
        assert_eq!(options.text_escaping, TextEscaping::Verbatim);
    }

    #[test_log::test]
    fn timezone_precedence() {
        let cli = parse(&["--timezone", "Asia/Tokyo"]);
        assert_eq!(cli.local_timezone(&config()).timezone_id(), "Asia/Tokyo");

        let cli = parse(&[]);
        assert_eq!(cli.local_timezone(&config()).timezone_id(), "Europe/Berlin");
    }
}
