use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jarup_launch::{
    CandidateSearch, CommandProbe, LaunchError, MINIMUM_RUNTIME, RuntimeCache, build_command,
    default_main_jar, discover, run, split_runtime_options,
};
use log::debug;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

const DEBUG_ENV: &str = "JARUP_LAUNCH_DEBUG";
const NO_CACHE_ENV: &str = "JARUP_NO_RUNTIME_CACHE";

#[derive(Debug, Parser)]
#[command(
    name = "jarup-launch",
    version,
    about = "Start an installed Java application on a suitable runtime"
)]
struct Args {
    /// Log every candidate runtime and probe result
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the application jars
    #[arg(long, value_name = "DIR")]
    app_dir: PathBuf,

    /// Jar to start, relative to the application directory
    #[arg(long, value_name = "JAR")]
    main_jar: Option<String>,

    /// Application arguments; `-J<opt>` is passed to the runtime as `<opt>`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<OsString>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose || std::env::var_os(DEBUG_ENV).is_some());

    match launch(args).await {
        Ok(code) => exit_code(code),
        Err(error) => {
            eprintln!("error: {error}");
            exit_code(error.exit_code())
        }
    }
}

async fn launch(args: Args) -> Result<i32, LaunchError> {
    let Some(main_jar) = args
        .main_jar
        .clone()
        .or_else(|| default_main_jar(&args.app_dir))
    else {
        return Err(LaunchError::UnknownMainJar {
            app_dir: args.app_dir,
        });
    };

    if !args.app_dir.is_dir() {
        return Err(LaunchError::io(
            "application directory is missing",
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                args.app_dir.display().to_string(),
            ),
        ));
    }

    let mut cache = if std::env::var_os(NO_CACHE_ENV).is_some() {
        debug!("Runtime cache disabled by {NO_CACHE_ENV}");
        None
    } else {
        let location = RuntimeCache::default_location(dirs::home_dir().as_deref());
        Some(RuntimeCache::load(location))
    };

    let candidates = CandidateSearch::new(&args.app_dir).collect(|name| std::env::var(name).ok());
    debug!("Considering {} candidate runtimes", candidates.len());

    let selected = discover(&candidates, cache.as_mut(), &CommandProbe, MINIMUM_RUNTIME).await?;

    let (runtime_options, app_args) = split_runtime_options(args.args);
    let command = build_command(
        &selected.java,
        &runtime_options,
        &args.app_dir,
        &main_jar,
        &app_args,
    );
    debug!("Starting {command:?}");
    run(command)
}

fn init_logging(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().add_filter_allow_str("jarup").build();
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
