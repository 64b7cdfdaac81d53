use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use netlayout::{
    Accessor, CoordinateAccessors, LayoutConfig, LayoutEngine, LayoutMode, LayoutRequest,
    Viewport, io,
};

/// Lay out network charts from the command line.
#[derive(Parser)]
#[command(name = "netlayout")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute node positions for a graph and print them as JSON
    Layout {
        /// Input graph file (.json, .yaml, .yml)
        #[arg(short, long)]
        input: PathBuf,

        /// Layout strategy
        #[arg(short, long, value_enum, default_value_t = ModeArg::Force)]
        mode: ModeArg,

        /// Viewport width in pixels
        #[arg(long, default_value = "800")]
        width: f64,

        /// Viewport height in pixels
        #[arg(long, default_value = "600")]
        height: f64,

        /// Upper bound on simulation frames in force mode
        #[arg(long, default_value = "1000")]
        max_steps: usize,

        /// Layout tuning file (.json, .yaml, .yml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Node field holding the raw x coordinate (coordinate mode)
        #[arg(long, default_value = "x")]
        x_field: String,

        /// Node field holding the raw y coordinate (coordinate mode)
        #[arg(long, default_value = "y")]
        y_field: String,

        /// Write output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit every published snapshot as one JSON line instead of only the final one
        #[arg(long)]
        trace: bool,
    },
}

/// Layout strategy names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Force,
    Coordinate,
    Circular,
    Radial,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Force => LayoutMode::Force,
            ModeArg::Coordinate => LayoutMode::Coordinate,
            ModeArg::Circular => LayoutMode::Circular,
            ModeArg::Radial => LayoutMode::Radial,
        }
    }
}

struct LayoutArgs {
    input: PathBuf,
    mode: LayoutMode,
    viewport: Viewport,
    max_steps: usize,
    config: Option<PathBuf>,
    accessors: CoordinateAccessors,
    output: Option<PathBuf>,
    trace: bool,
}

fn layout(args: LayoutArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => io::read_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    let graph = io::read_graph(&args.input)
        .with_context(|| format!("failed to load graph {}", args.input.display()))?;
    info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        mode = %args.mode,
        "loaded graph"
    );

    let mut engine = LayoutEngine::new(config);
    engine.set_input(
        LayoutRequest::new(args.mode, graph, args.viewport).with_accessors(args.accessors),
    );

    let mut lines = Vec::new();
    if args.trace {
        lines.push(io::to_json_line(&*engine.snapshot())?);
    }

    let mut steps = 0;
    while steps < args.max_steps && engine.needs_frame() {
        let before = engine.snapshot().version;
        engine.tick();
        steps += 1;

        let snapshot = engine.snapshot();
        if args.trace && snapshot.version != before {
            lines.push(io::to_json_line(&*snapshot)?);
        }
    }
    info!(steps, converged = !engine.needs_frame(), "layout finished");

    let text = if args.trace {
        lines.join("\n") + "\n"
    } else {
        io::to_json(&*engine.snapshot())? + "\n"
    };
    emit(&text, args.output.as_deref())
}

fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote layout");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netlayout=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Layout {
            input,
            mode,
            width,
            height,
            max_steps,
            config,
            x_field,
            y_field,
            output,
            trace,
        }) => {
            layout(LayoutArgs {
                input,
                mode: mode.into(),
                viewport: Viewport::new(width, height),
                max_steps,
                config,
                accessors: CoordinateAccessors {
                    x: Accessor::field(x_field),
                    y: Accessor::field(y_field),
                },
                output,
                trace,
            })?;
        }
        None => {
            println!("netlayout: no command specified. Use --help for usage.");
        }
    }

    Ok(())
}
