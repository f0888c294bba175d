mod app;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Portage set maintenance
///
/// Validates portage set definition files against the ebuild repository and
/// regenerates the package.accept_keywords/, package.use/ and sets/ files
/// derived from them.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Force overwriting of generated set files
    #[clap(short, long)]
    force: bool,

    /// Only print what would be done
    #[clap(short = 'n', long)]
    dry_run: bool,

    /// Suppress set output
    #[clap(short, long)]
    quiet: bool,

    /// Portage configuration path; generated files are created within
    /// package.accept_keywords/, package.use/ and sets/ below it
    #[clap(short, long, default_value = "/etc/portage")]
    output: PathBuf,

    /// Fail on warnings (unknown ebuilds, unknown USE flags)
    #[clap(long)]
    strict: bool,

    /// Disable color output
    #[clap(long)]
    no_color: bool,

    /// Ebuild repository root (auto-detected if not specified)
    #[clap(long, env = "PORTSETS_REPO")]
    repo: Option<PathBuf>,

    /// Portage set definition files
    #[clap(required = true)]
    sets: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.no_color {
        console::set_colors_enabled(false);
    }

    let options = app::Options {
        force: args.force,
        dry_run: args.dry_run,
        quiet: args.quiet,
        strict: args.strict,
        color: !args.no_color,
        output: args.output,
        repo: args.repo,
        sets: args.sets,
    };
    app::run(&options)
}
