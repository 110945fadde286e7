use std::fs::OpenOptions;
use std::io;

use log::{error, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use nimble::backend::HeadlessBackend;
use nimble::{create_clap_command, handle_clap_matches, CliOptions, DisplayTarget, Host, Input};

mod demo;

fn init_logging(opts: &CliOptions) -> io::Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        opts.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    if let Some(path) = &opts.log_file {
        let log_file = OpenOptions::new().create(true).append(true).open(path)?;
        loggers.push(WriteLogger::new(opts.log_level, Config::default(), log_file));
    }
    CombinedLogger::init(loggers).map_err(io::Error::other)
}

fn run(opts: CliOptions) -> nimble::Result<i32> {
    let input = Input::new();
    let mut backdrop = demo::Backdrop::new(input.clone());
    let mut stars = demo::Starfield::new(input.clone(), 256);
    let mut cursor = demo::Cursor::new(input.clone());

    let mut host = Host::with_input(opts.config, input);
    host.register(&mut backdrop);
    host.register(&mut stars);
    host.register(&mut cursor);

    match opts.target {
        DisplayTarget::Window => host.run(),
        DisplayTarget::Headless => {
            let mut recorder = None;
            let code = host.run_with(|config| {
                let backend = HeadlessBackend::open(config)?;
                recorder = Some(backend.recorder());
                Ok(backend)
            })?;
            if let Some(recorder) = recorder {
                info!("Headless run presented {} frames", recorder.lock().presented);
            }
            Ok(code)
        }
    }
}

fn main() {
    let matches = create_clap_command().get_matches();
    let opts = handle_clap_matches(&matches);
    if let Err(e) = init_logging(&opts) {
        eprintln!("Unable to set up logging: {e}");
    }

    let code = match run(opts) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("nimble: {e}");
            1
        }
    };
    std::process::exit(code);
}
