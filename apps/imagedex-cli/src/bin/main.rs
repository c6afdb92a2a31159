use std::env;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use imagedex_core::config::{resolve_with_base, Config};
use imagedex_index::detail_rows;
use imagedex_library::{Library, LoadEvent};

#[derive(Debug, PartialEq)]
struct Args {
    paths: Vec<PathBuf>,
    search: Option<String>,
    details: bool,
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} [--search QUERY] [--details] PATH...", prog);
    std::process::exit(2)
}

/// Parse the arguments after the program name. Path arguments are expanded
/// and resolved against `cwd`. `Err` carries the message to print before
/// usage; an empty message means help was asked for.
fn parse_args(args: &[String], cwd: &Path) -> Result<Args, String> {
    let mut parsed = Args { paths: Vec::new(), search: None, details: false };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--search" | "-s" => {
                let query = args.get(i + 1).ok_or_else(|| "--search requires a query".to_string())?;
                parsed.search = Some(query.clone());
                i += 2; continue;
            }
            "--details" | "-d" => parsed.details = true,
            "--help" | "-h" => return Err(String::new()),
            s if s.starts_with('-') => return Err(format!("Unknown flag: {}", s)),
            s => parsed.paths.push(resolve_with_base(cwd, s)),
        }
        i += 1;
    }
    if parsed.paths.is_empty() { return Err("no paths given".to_string()); }
    Ok(parsed)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imagedex=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn load_with_progress(library: &Library, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut task = library.load(paths)?;
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );
    while let Some(event) = task.next().await {
        match event {
            LoadEvent::Started { total } => pb.set_length(total as u64),
            LoadEvent::Progress { processed, path, .. } => {
                pb.set_position(processed as u64);
                pb.set_message(path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
            }
            LoadEvent::Finished { records } => pb.finish_with_message(format!("classified {} images", records)),
        }
    }
    let summary = task.wait().await?;
    println!("Loaded {} images in {:.2?}", summary.records, summary.elapsed);
    Ok(())
}

fn print_sections(library: &Library, details: bool) -> anyhow::Result<()> {
    let sections = library.sections()?;
    if sections.is_empty() {
        println!("No sections.");
        return Ok(());
    }
    for section in sections {
        println!("\n{} ({})", section.name, section.records.len());
        for record in &section.records {
            let preview = match record.thumbnail() {
                Some(t) => format!("{}x{}", t.width(), t.height()),
                None => "no preview".to_string(),
            };
            println!("  {} [{}]", record.display_name(), preview);
            if details {
                for row in detail_rows(record.categories()) {
                    println!("      {} : {:.3}", row.label, row.confidence);
                }
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut argv: Vec<String> = env::args().collect();
    let prog = if argv.is_empty() { "imagedex".to_string() } else { argv.remove(0) };
    // Arguments come before config so `--help` works with a broken config.toml.
    let args = match parse_args(&argv, &env::current_dir()?) {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() { eprintln!("{}", msg); }
            usage(&prog)
        }
    };
    init_tracing();
    debug!(?args, "parsed arguments");
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let library = Library::from_settings(&settings);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(load_with_progress(&library, args.paths))?;

    if let Some(query) = &args.search {
        library.search(query)?;
        println!("Search: \"{}\"", query);
    }
    print_sections(&library, args.details)
}
