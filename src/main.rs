use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};

use cgview::cgroupfs::mounts::SchemaResolver;
use cgview::cgroupfs::parsers::AttributeReader;
use cgview::cgroupfs::process::ProcfsScanner;
use cgview::config::ReportConfig;
use cgview::core::controller::Controller;
use cgview::render::section::SectionRenderer;
use cgview::render::{stdout_is_tty, terminal_width, Palette};
use cgview::report::Report;

/// Display the resource-control (cgroup) hierarchy of the host, one section per controller
#[derive(Parser, Debug)]
#[command(name = "cgview")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Maximum depth of the displayed nodes, the root having a depth of 0
    #[arg(short, long, value_name = "N")]
    depth: Option<usize>,

    /// List the processes attached to each node
    #[arg(short, long)]
    processes: bool,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Increase the verbosity of the logs written to stderr (-v: info, -vv: debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Inspect the tree mounted at this directory instead of the one of the host
    #[arg(long, value_name = "DIR")]
    cgroup_root: Option<PathBuf>,

    /// Width of the report, instead of the width of the terminal
    #[arg(long, value_name = "COLS")]
    width: Option<usize>,

    /// Controllers to display (cpu, cpuset, memory, io). All enabled controllers if omitted.
    #[arg(value_name = "CONTROLLER")]
    controllers: Vec<Controller>,
}

impl Cli {
    fn report_config(&self) -> ReportConfig {
        ReportConfig::default()
            .with_max_depth(self.depth)
            .with_processes(self.processes)
            .with_color(!self.no_color)
            .with_controllers(self.controllers.clone())
            .with_width(self.width)
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_panic_logging();
    init_logging(cli.log_level());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("cgview: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.report_config();

    let resolver = match &cli.cgroup_root {
        Some(root) => SchemaResolver::with_root(root),
        None => SchemaResolver::default(),
    };
    let schema = resolver
        .resolve()
        .context("Could not find the resource-control hierarchy")?;

    info!("Using the {} layout", schema.label());

    let reader = AttributeReader;
    let scanner = ProcfsScanner::new();
    let report = Report::new(&config, schema.as_ref(), &reader, &scanner);

    let palette = Palette::new(config.color() && stdout_is_tty());
    let renderer = SectionRenderer::new(config.width().unwrap_or_else(terminal_width), palette);

    let stdout = io::stdout();
    report
        .write(&mut stdout.lock(), &renderer)
        .context("Could not write the report")
}

fn setup_panic_logging() {
    // As panics are erased by the application exiting, log the panic as an error
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        error!("Panic occured: {:?}", info);
        default_hook(info);
    }))
}

fn init_logging(level: LevelFilter) {
    // stdout holds the report
    if let Err(e) = WriteLogger::init(level, Config::default(), io::stderr()) {
        eprintln!("Could not initialize logging: {}", e);
    }
}
