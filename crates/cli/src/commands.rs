//! Clap command definition.

use clap::{Arg, ArgAction, Command};

/// Build the `txjournal` command.
pub fn build_cli() -> Command {
    Command::new("txjournal")
        .about("List or prune the committed entries of a transaction journal store")
        .arg(
            Arg::new("store")
                .value_name("STORE_DIR")
                .help("Journal store directory")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("types")
                .long("types")
                .short('t')
                .value_name("LIST")
                .help("Comma-separated type names to include (default: all types)"),
        )
        .arg(
            Arg::new("prune")
                .long("prune")
                .help("Remove every entry of the selected types")
                .action(ArgAction::SetTrue)
                .requires("types"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output, one object per line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Journal configuration file (default: <STORE_DIR>/txjournal.toml)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more; repeat for more detail")
                .action(ArgAction::Count),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_single_store_argument() {
        let matches = build_cli()
            .try_get_matches_from(["txjournal", "/var/store", "--types", "A,B", "-vv"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("store").map(String::as_str),
            Some("/var/store")
        );
        assert_eq!(
            matches.get_one::<String>("types").map(String::as_str),
            Some("A,B")
        );
        assert_eq!(matches.get_count("verbose"), 2);
        assert!(!matches.get_flag("prune"));
    }

    #[test]
    fn test_rejects_missing_or_extra_positionals() {
        assert!(build_cli().try_get_matches_from(["txjournal"]).is_err());
        assert!(build_cli()
            .try_get_matches_from(["txjournal", "a", "b"])
            .is_err());
    }

    #[test]
    fn test_prune_requires_types() {
        assert!(build_cli()
            .try_get_matches_from(["txjournal", "/var/store", "--prune"])
            .is_err());
        let matches = build_cli()
            .try_get_matches_from(["txjournal", "/var/store", "--prune", "--types", "A"])
            .unwrap();
        assert!(matches.get_flag("prune"));
    }
}
