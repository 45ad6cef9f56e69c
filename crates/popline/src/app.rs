use clap::{Arg, ArgAction, Command};
use clap_complete::Shell;

pub fn build_cli() -> Command {
    Command::new("popline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and drive the Popline placement and paste-delivery core")
        .long_about(
            "Popline shows a quick-capture popup near your focus point and delivers the \
             captured text back into the previously focused application. This CLI exposes \
             the core subsystem for inspection and scripting: resolve platform \
             capabilities, detect terminal-multiplexer environments, compute popup \
             placements, and run a paste delivery.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("capabilities")
                .about("Resolve and print the platform capability set")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about("Detect the terminal-multiplexer environment")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("position")
                .about("Compute popup placement for a strategy")
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .short('s')
                        .help("Placement strategy (overrides config)")
                        .value_parser([
                            "center",
                            "active-window-center",
                            "active-text-field",
                            "cursor",
                        ]),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .help("Popup width in pixels (overrides config)")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("height")
                        .long("height")
                        .help("Popup height in pixels (overrides config)")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("paste")
                .about("Capture the foreground app and deliver text into it")
                .arg(
                    Arg::new("text")
                        .help("Text to deliver")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .value_parser(clap::value_parser!(Shell))
                        .index(1),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["popline"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_short() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["popline", "-v", "capabilities"]);
        assert!(matches.is_ok());
        assert!(matches.unwrap().get_flag("verbose"));
    }

    #[test]
    fn test_cli_capabilities_json_flag() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["popline", "capabilities", "--json"])
            .unwrap();
        let sub = matches.subcommand_matches("capabilities").unwrap();
        assert!(sub.get_flag("json"));
    }

    #[test]
    fn test_cli_position_arguments() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec![
                "popline", "position", "--strategy", "cursor", "--width", "500", "--height",
                "250",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("position").unwrap();
        assert_eq!(sub.get_one::<String>("strategy").unwrap(), "cursor");
        assert_eq!(*sub.get_one::<u32>("width").unwrap(), 500);
        assert_eq!(*sub.get_one::<u32>("height").unwrap(), 250);
    }

    #[test]
    fn test_cli_position_rejects_unknown_strategy() {
        let app = build_cli();
        let matches =
            app.try_get_matches_from(vec!["popline", "position", "--strategy", "top-left"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_paste_requires_text() {
        let app = build_cli();
        assert!(build_cli()
            .try_get_matches_from(vec!["popline", "paste"])
            .is_err());
        let matches = app
            .try_get_matches_from(vec!["popline", "paste", "hello world"])
            .unwrap();
        let sub = matches.subcommand_matches("paste").unwrap();
        assert_eq!(sub.get_one::<String>("text").unwrap(), "hello world");
    }

    #[test]
    fn test_cli_completions_shell_required() {
        let app = build_cli();
        assert!(app
            .try_get_matches_from(vec!["popline", "completions"])
            .is_err());
    }
}
