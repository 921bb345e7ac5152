use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "panos-appgroup")]
#[command(version)]
#[command(about = "Manage a PAN-OS application group declaratively", long_about = None)]
pub struct Cli {
    /// JSON arguments file (read from stdin when omitted)
    #[arg(value_name = "ARGS_FILE")]
    pub args_file: Option<PathBuf>,

    /// Report what would change without touching the device
    #[arg(long, env = "PANOS_APPGROUP_CHECK")]
    pub check: bool,

    /// Include a before/after rendering of the object in the result
    #[arg(long)]
    pub diff: bool,

    /// Print the module documentation as JSON and exit
    #[arg(long, conflicts_with_all = ["args_file", "check", "diff"])]
    pub describe: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["panos-appgroup"]).unwrap();
        assert!(cli.args_file.is_none());
        assert!(!cli.check);
        assert!(!cli.diff);
        assert!(!cli.describe);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_args_file_and_flags() {
        let cli =
            Cli::try_parse_from(["panos-appgroup", "args.json", "--check", "--diff", "-vv"])
                .unwrap();
        assert_eq!(cli.args_file, Some(PathBuf::from("args.json")));
        assert!(cli.check);
        assert!(cli.diff);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_describe_conflicts_with_run_flags() {
        assert!(Cli::try_parse_from(["panos-appgroup", "--describe"]).is_ok());
        assert!(Cli::try_parse_from(["panos-appgroup", "--describe", "--check"]).is_err());
        assert!(Cli::try_parse_from(["panos-appgroup", "--describe", "args.json"]).is_err());
    }
}
