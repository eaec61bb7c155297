//! marc-audit: validate a MARC record file against a Koha framework.
//!
//! Exit status: 0 when the whole stream was audited (whatever was found),
//! 1 when a schema source is unusable, 2 for any other fatal failure.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use marc_audit::config::{
    AUTHORIZED_VALUES_VAR, CONTROLLED_VALUES_VAR, ERRORS_VAR, FRAMEWORK_VAR, RECORDS_VAR,
};
use marc_audit::logging::{init_logging, LogConfig, LogFormat};
use marc_audit::{audit, AuditConfig, AuditError, SchemaSources};

#[derive(Parser)]
#[command(
    name = "marc-audit",
    version,
    about = "Validate MARC records against a Koha MARC framework",
    long_about = "Validate an ISO 2709 record file against a Koha MARC framework export,\n\
                  its authorized values and a controlled-value XML document.\n\n\
                  Every problem found is written as one row of a semicolon-separated report.\n\
                  Paths may also be given through environment variables or a .env file."
)]
struct Cli {
    /// ISO 2709 record file to audit.
    #[arg(long, value_name = "PATH", env = RECORDS_VAR)]
    records: PathBuf,

    /// Error report to create.
    #[arg(long, value_name = "PATH", env = ERRORS_VAR)]
    errors: PathBuf,

    /// Koha MARC framework export (CSV).
    #[arg(long, value_name = "PATH", env = FRAMEWORK_VAR)]
    framework: PathBuf,

    /// Koha authorized values export (semicolon CSV).
    #[arg(long = "authorized-values", value_name = "PATH", env = AUTHORIZED_VALUES_VAR)]
    authorized_values: PathBuf,

    /// Controlled values document (XML).
    #[arg(long = "controlled-values", value_name = "PATH", env = CONTROLLED_VALUES_VAR)]
    controlled_values: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    log_format: LogFormatArg,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
        };
        LogConfig {
            use_env_filter: !self.verbosity.is_present(),
            ..LogConfig::default()
        }
        .with_level_filter(self.verbosity.tracing_level_filter())
        .with_format(format)
        .with_ansi(io::stderr().is_terminal())
    }

    fn into_config(self) -> AuditConfig {
        AuditConfig {
            records: self.records,
            errors: self.errors,
            schema: SchemaSources {
                framework: self.framework,
                authorized_values: self.authorized_values,
                controlled_values: self.controlled_values,
            },
        }
    }
}

fn exit_code(error: &AuditError) -> u8 {
    if error.is_schema_error() {
        1
    } else {
        2
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_config());

    match audit::run(&cli.into_config()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "audit aborted");
            ExitCode::from(exit_code(&error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use marc_audit::SchemaError;

    #[test]
    fn test_every_path_has_an_env_fallback() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("records").as_deref(), Some(RECORDS_VAR));
        assert_eq!(env_of("errors").as_deref(), Some(ERRORS_VAR));
        assert_eq!(env_of("framework").as_deref(), Some(FRAMEWORK_VAR));
        assert_eq!(env_of("authorized_values").as_deref(), Some(AUTHORIZED_VALUES_VAR));
        assert_eq!(env_of("controlled_values").as_deref(), Some(CONTROLLED_VALUES_VAR));
    }

    #[test]
    fn test_arguments_fill_the_config() {
        let cli = Cli::try_parse_from([
            "marc-audit",
            "--records",
            "in.mrc",
            "--errors",
            "out.csv",
            "--framework",
            "fw.csv",
            "--authorized-values",
            "av.csv",
            "--controlled-values",
            "cv.xml",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.records, PathBuf::from("in.mrc"));
        assert_eq!(config.errors, PathBuf::from("out.csv"));
        assert_eq!(config.schema.framework, PathBuf::from("fw.csv"));
        assert_eq!(config.schema.authorized_values, PathBuf::from("av.csv"));
        assert_eq!(config.schema.controlled_values, PathBuf::from("cv.xml"));
    }

    #[test]
    fn test_exit_codes() {
        let schema = AuditError::Schema(SchemaError::Xml(quick_xml::DeError::Custom(
            "truncated".to_string(),
        )));
        assert_eq!(exit_code(&schema), 1);
        let io = AuditError::Io(io::Error::other("disk full"));
        assert_eq!(exit_code(&io), 2);
    }
}
