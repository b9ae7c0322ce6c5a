use clap::{ArgAction, Parser, Subcommand};
use mdtree::config::{self, GeneratorConfig, SiteConfig};
use mdtree::generate::Generator;
use mdtree::markdown::PulldownEngine;
use mdtree::{output, serve};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mdtree")]
#[command(about = "Turn a directory tree of markdown documents into a static site")]
#[command(long_about = "\
Turn a directory tree of markdown documents into a static site

The output mirrors the source tree. Every directory gets an index.html,
every markdown document (.md, .markdown, .mkd) gets a page with a sidebar
and a table of contents.

Source structure:

  docs/
  ├── mdtree.toml          # Optional config (see gen-config)
  ├── index.md             # Content of the root index page
  ├── intro.md             # → public/intro.html
  ├── _drafts/             # Leading _ or . = never published
  └── guide/
      └── setup.markdown   # → public/guide/setup.html (+ guide/index.html)

An existing index.html in the output is never overwritten. Pages are
rebuilt on every run.

Without a subcommand, mdtree generates the site and then serves it.
Run 'mdtree gen-config' to generate a documented mdtree.toml.")]
#[command(version)]
struct Cli {
    /// Markdown source directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory [default: `output` from mdtree.toml, else "public"]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the markdown tree into the output directory
    Generate,
    /// Serve the output directory over HTTP
    Serve {
        /// Port to listen on [default: `server.port` from mdtree.toml, else 8080]
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a stock mdtree.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    mdtree::init_tracing(cli.verbose);

    match cli.command {
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
        Some(Command::Generate) => {
            let site = config::load_config(&cli.root)?;
            generate(&cli.root, &output_dir(cli.output.as_deref(), &site), &site)?;
        }
        Some(Command::Serve { port }) => {
            let site = config::load_config(&cli.root)?;
            let output_path = output_dir(cli.output.as_deref(), &site);
            serve(&output_path, port.unwrap_or(site.server.port))?;
        }
        None => {
            let site = config::load_config(&cli.root)?;
            let output_path = output_dir(cli.output.as_deref(), &site);
            generate(&cli.root, &output_path, &site)?;
            serve(&output_path, site.server.port)?;
        }
    }

    Ok(())
}

/// The `--output` flag wins over the config file.
fn output_dir(flag: Option<&Path>, site: &SiteConfig) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&site.output))
}

fn generate(
    root: &Path,
    output_path: &Path,
    site: &SiteConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = PulldownEngine::new(&site.markdown)?;
    let generator = Generator::new(
        GeneratorConfig {
            root_path: root.to_path_buf(),
            output_path: output_path.to_path_buf(),
        },
        engine,
    )?;

    println!("==> Generating {}", generator.paths().output().display());
    let report = generator.generate()?;
    output::print_generate_output(&report);
    Ok(())
}

/// Serve on a multi-thread runtime that lives for this call only.
fn serve(output_path: &Path, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let root = serve::validate_root(output_path)?;
    output::print_serve_banner(&root, port);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve::run(&root, port))?;
    Ok(())
}
