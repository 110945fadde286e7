use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;

pub mod backend;
pub mod core;
pub mod error;
pub mod input;
pub mod pipeline;

pub use crate::core::{PixMap, Pixel};
pub use error::{HostError, Result};
pub use input::Input;
pub use pipeline::{Host, HostConfig, HostState, RenderClient};

/// Which backend the binary drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    Window,
    Headless,
}

/// Everything the command line decides.
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config: HostConfig,
    pub target: DisplayTarget,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

/// Headless runs need an end, this is used when `--frames` is not given.
pub const DEFAULT_HEADLESS_FRAMES: u64 = 120;

pub fn create_clap_command() -> Command {
    Command::new("nimble")
        .about("Single window pixel framebuffer host")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("title")
                .short('t')
                .long("title")
                .value_name("TITLE")
                .help("Window title")
                .default_value("nimble"),
        )
        .arg(
            Arg::new("width")
                .short('W')
                .long("width")
                .value_name("PIXELS")
                .help("Requested window width")
                .value_parser(value_parser!(i32).range(1..))
                .default_value("800"),
        )
        .arg(
            Arg::new("height")
                .short('H')
                .long("height")
                .value_name("PIXELS")
                .help("Requested window height")
                .value_parser(value_parser!(i32).range(1..))
                .default_value("600"),
        )
        .arg(
            Arg::new("fps")
                .long("fps")
                .value_name("FPS")
                .help("Target frame rate, 0 for unthrottled")
                .value_parser(value_parser!(usize))
                .default_value("60"),
        )
        .arg(
            Arg::new("frames")
                .short('n')
                .long("frames")
                .value_name("COUNT")
                .help("Quit after this many frames")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("show-fps")
                .long("show-fps")
                .help("Show frame metrics in the window title")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Render into memory instead of a window")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"])
                .default_value("info"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Also append the log to this file")
                .value_parser(value_parser!(PathBuf)),
        )
}

pub fn handle_clap_matches(matches: &clap::ArgMatches) -> CliOptions {
    let defaults = HostConfig::default();
    let target = if matches.get_flag("headless") {
        DisplayTarget::Headless
    } else {
        DisplayTarget::Window
    };
    let frame_limit = matches.get_one::<u64>("frames").copied().or(match target {
        DisplayTarget::Headless => Some(DEFAULT_HEADLESS_FRAMES),
        DisplayTarget::Window => None,
    });
    let config = HostConfig {
        title: matches
            .get_one::<String>("title")
            .cloned()
            .unwrap_or(defaults.title),
        width: matches
            .get_one::<i32>("width")
            .copied()
            .unwrap_or(defaults.width),
        height: matches
            .get_one::<i32>("height")
            .copied()
            .unwrap_or(defaults.height),
        target_fps: matches
            .get_one::<usize>("fps")
            .copied()
            .filter(|fps| *fps > 0),
        frame_limit,
        show_fps: matches.get_flag("show-fps"),
    };
    let log_level = match matches.get_one::<String>("log-level").map(|s| s.as_str()) {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    CliOptions {
        config,
        target,
        log_level,
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        let matches = create_clap_command()
            .try_get_matches_from(std::iter::once("nimble").chain(args.iter().copied()))
            .unwrap();
        handle_clap_matches(&matches)
    }

    #[test]
    fn defaults_match_host_config() {
        let opts = parse(&[]);
        assert_eq!(opts.config, HostConfig::default());
        assert_eq!(opts.target, DisplayTarget::Window);
        assert_eq!(opts.log_level, LevelFilter::Info);
        assert!(opts.log_file.is_none());
    }

    #[test]
    fn flags_fill_the_config() {
        let opts = parse(&[
            "--title", "demo", "-W", "320", "-H", "200", "--fps", "0", "--frames", "9",
            "--show-fps", "-l", "trace",
        ]);
        assert_eq!(opts.config.title, "demo");
        assert_eq!((opts.config.width, opts.config.height), (320, 200));
        assert_eq!(opts.config.target_fps, None);
        assert_eq!(opts.config.frame_limit, Some(9));
        assert!(opts.config.show_fps);
        assert_eq!(opts.log_level, LevelFilter::Trace);
    }

    #[test]
    fn headless_gets_a_frame_limit() {
        let opts = parse(&["--headless"]);
        assert_eq!(opts.target, DisplayTarget::Headless);
        assert_eq!(opts.config.frame_limit, Some(DEFAULT_HEADLESS_FRAMES));
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(create_clap_command()
            .try_get_matches_from(["nimble", "--width", "0"])
            .is_err());
    }
}
