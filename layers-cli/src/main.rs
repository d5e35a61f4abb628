mod script;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layers::{Bundle, HeadlessBackend, LayersConfig, RootHost};

use script::{Screen, Script};

#[derive(Parser, Debug)]
#[command(name = "layers", version)]
struct Cli {
    /// Log stack transitions at debug level.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a session script against the headless backend and print the final stack.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input session script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the saved host state here after the script ran.
    #[arg(long)]
    state_out: Option<PathBuf>,

    /// Restore the host from a previously written state file.
    #[arg(long)]
    restore: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let script = Script::from_path(&args.in_path)?;
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            LayersConfig::from_json(&text)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => LayersConfig::default(),
    };
    let saved = match &args.restore {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read state '{}'", path.display()))?;
            Some(
                Bundle::from_bytes(&bytes)
                    .with_context(|| format!("decode state '{}'", path.display()))?,
            )
        }
        None => None,
    };

    let mut backend = HeadlessBackend::new();
    script.register_animations(&mut backend)?;

    let mut host = RootHost::create(&mut backend, script::registry(), config, saved.as_ref())?;
    host.on_start(&mut backend)?;
    host.on_resume(&mut backend)?;

    for (i, step) in script.steps.iter().enumerate() {
        tracing::debug!(step = i, ?step, "running step");
        script::run_step(&mut host, &mut backend, step)
            .with_context(|| format!("step {i} ({step:?})"))?;
    }
    script::settle(&mut host, &mut backend)?;

    print_report(&host, &backend);

    if let Some(path) = &args.state_out {
        host.on_pause(&mut backend)?;
        host.on_stop(&mut backend)?;
        let state = host.on_save_state(&mut backend, false)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(path, state.to_bytes()?)
            .with_context(|| format!("write state '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    host.on_destroy(&mut backend)?;
    Ok(())
}

fn print_report(host: &RootHost, backend: &HeadlessBackend) {
    let layers = host.layers();
    println!("stack size {}", layers.stack_size());
    for i in 0..layers.stack_size() {
        let Some(layer) = layers.get(i) else {
            continue;
        };
        let view = match layer.view() {
            Some(view) if backend.is_presented(view) => "presented",
            Some(_) => "attached",
            None => "hidden",
        };
        let restores = layer
            .downcast_ref::<Screen>()
            .map(|s| format!(" restores={}", s.restores))
            .unwrap_or_default();
        println!(
            "{i} {} {} {view} {:?}{restores}",
            layer.tag(),
            layer.name().unwrap_or("-"),
            layer.lifecycle(),
        );
    }
    println!(
        "views added {} removed {} released {}",
        backend.added(),
        backend.removed(),
        backend.released()
    );
}
