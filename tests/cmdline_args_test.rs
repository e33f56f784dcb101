//! Tests for command-line argument parsing
//!
//! Note: These tests verify the argument parser configuration by creating
//! a test parser with the same structure as the main application.

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};
use std::path::PathBuf;

/// Create a command with the same argument structure as the main binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("bowling-pose")
        .version("0.1.0")
        .about("Cricket bowling pose risk analysis")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('C')
                .long("config")
                .value_name("FILE")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to configuration file (YAML format)"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
        .subcommand(
            ClapCommand::new("summarize")
                .arg(
                    Arg::new("angles")
                        .short('a')
                        .long("angles")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(Arg::new("classify").long("classify").action(ArgAction::SetTrue)),
        )
        .subcommand(
            ClapCommand::new("label")
                .arg(
                    Arg::new("angles")
                        .short('a')
                        .long("angles")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            ClapCommand::new("analyze")
                .arg(
                    Arg::new("video")
                        .short('v')
                        .long("video")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("stride")
                        .short('s')
                        .long("stride")
                        .value_parser(value_parser!(usize)),
                )
                .arg(Arg::new("max-frames").long("max-frames").value_parser(value_parser!(usize)))
                .arg(Arg::new("csv").long("csv").value_parser(value_parser!(PathBuf)))
                .arg(Arg::new("annotate").long("annotate").value_parser(value_parser!(PathBuf)))
                .arg(Arg::new("classify").long("classify").action(ArgAction::SetTrue)),
        )
        .subcommand(ClapCommand::new("example-config"))
}

#[test]
fn test_summarize_arguments() {
    let matches = create_test_command()
        .try_get_matches_from(["bowling-pose", "summarize", "--angles", "clip.csv", "--classify"])
        .unwrap();

    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "summarize");
    assert_eq!(sub.get_one::<PathBuf>("angles"), Some(&PathBuf::from("clip.csv")));
    assert!(sub.get_flag("classify"));
}

#[test]
fn test_label_requires_output() {
    let result = create_test_command().try_get_matches_from(["bowling-pose", "label", "--angles", "clip.csv"]);
    assert!(result.is_err());

    let matches = create_test_command()
        .try_get_matches_from(["bowling-pose", "label", "-a", "clip.csv", "-o", "labeled.csv"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    assert_eq!(sub.get_one::<PathBuf>("output"), Some(&PathBuf::from("labeled.csv")));
}

#[test]
fn test_analyze_arguments() {
    let matches = create_test_command()
        .try_get_matches_from([
            "bowling-pose",
            "analyze",
            "--video",
            "delivery.mp4",
            "--stride",
            "3",
            "--max-frames",
            "300",
            "--csv",
            "angles.csv",
            "--annotate",
            "annotated.mp4",
        ])
        .unwrap();

    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "analyze");
    assert_eq!(sub.get_one::<usize>("stride"), Some(&3));
    assert_eq!(sub.get_one::<usize>("max-frames"), Some(&300));
    assert_eq!(sub.get_one::<PathBuf>("annotate"), Some(&PathBuf::from("annotated.mp4")));
    assert!(!sub.get_flag("classify"));
}

#[test]
fn test_invalid_stride_rejected() {
    let result = create_test_command().try_get_matches_from([
        "bowling-pose",
        "analyze",
        "--video",
        "delivery.mp4",
        "--stride",
        "five",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let matches = create_test_command()
        .try_get_matches_from([
            "bowling-pose",
            "summarize",
            "--angles",
            "clip.csv",
            "--debug",
            "--config",
            "settings.yaml",
        ])
        .unwrap();

    let (_, sub) = matches.subcommand().unwrap();
    assert!(sub.get_flag("debug"));
    assert_eq!(sub.get_one::<PathBuf>("config"), Some(&PathBuf::from("settings.yaml")));
}

#[test]
fn test_subcommand_required() {
    assert!(create_test_command().try_get_matches_from(["bowling-pose"]).is_err());
}
