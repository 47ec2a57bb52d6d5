//! `quire` command-line interface.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use quire::RenderOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "quire")]
#[command(version)]
#[command(about = "Render data files through templates", long_about = None)]
struct Cli {
    /// Input data: a .yml/.yaml, .json or .csv file, or an inline JSON object
    #[arg(short, long, default_value = "{}")]
    input: String,

    /// Overwrite a field before rendering, as path=value (repeatable)
    #[arg(short = 'w', long = "overwrite", value_name = "PATH=VALUE")]
    overwrites: Vec<String>,

    /// Template file; the path itself may contain template expressions
    #[arg(short, long, conflicts_with = "template_inline")]
    template: Option<String>,

    /// Template text given directly
    #[arg(long)]
    template_inline: Option<String>,

    /// Output file (a template); stdout when omitted. A .html target enables escaping
    #[arg(short, long)]
    output: Option<String>,

    /// Allow running commands from templates; implies --allow-io and --allow-network
    #[arg(long)]
    allow_exec: bool,

    /// Allow filesystem and environment access from templates
    #[arg(long)]
    allow_io: bool,

    /// Allow network access from templates
    #[arg(long)]
    allow_network: bool,

    /// Fail on undefined values instead of rendering them empty
    #[arg(long)]
    strict: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn render_options(&self) -> RenderOptions {
        let mut options = RenderOptions::new(&self.input)
            .overwrites(&self.overwrites)
            .allow_exec(self.allow_exec)
            .allow_io(self.allow_io)
            .allow_network(self.allow_network)
            .strict(self.strict);
        if let Some(template) = &self.template {
            options = options.template_file(template);
        }
        if let Some(text) = &self.template_inline {
            options = options.template_inline(text);
        }
        if let Some(output) = &self.output {
            options = options.output(output);
        }
        options
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "quire=warn",
        1 => "quire=debug",
        _ => "quire=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    quire::render_to_file(&cli.render_options())?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
