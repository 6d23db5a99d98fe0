use clap::Parser;
use fmeda::cli::commands::{
    calc, clear, cmp, completions, export, fm, import, init, project, report, results, sf, tree,
};
use fmeda::cli::{Cli, Commands, GlobalOpts};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head` or `grep -q` panics on a broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => init::run(args, &global),
        Commands::Project(cmd) => project::run(cmd, &global),
        Commands::Sf(cmd) => sf::run(cmd, &global),
        Commands::Cmp(cmd) => cmp::run(cmd, &global),
        Commands::Fm(cmd) => fm::run(cmd, &global),
        Commands::Calc(args) => calc::run(args, &global),
        Commands::Results(args) => results::run(args, &global),
        Commands::Report(args) => report::run(args, &global),
        Commands::Tree(args) => tree::run(args, &global),
        Commands::Export(args) => export::run(args, &global),
        Commands::Import(args) => import::run(args, &global),
        Commands::Clear(args) => clear::run(args, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--quiet`/`--verbose`
fn init_tracing(global: &GlobalOpts) {
    let default_level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fmeda={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
