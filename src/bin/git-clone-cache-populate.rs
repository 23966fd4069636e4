//! Pre-fills the clone cache from local checkouts or remote URLs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

use git_clone_cache::cache::{CachePaths, GitCli, MirrorCache};
use git_clone_cache::populate::{self, Populator};
use git_clone_cache::{Config, event_log};

#[derive(Parser)]
#[command(
    name = "git-clone-cache-populate",
    about = "Pre-fill the git clone cache from local checkouts or remote URLs"
)]
struct Cli {
    /// Treat each target as a directory and search it for checkouts
    #[arg(short, long)]
    recursive: bool,

    /// Path to the real git (default: search PATH, skipping the wrapper)
    #[arg(long, value_name = "PATH")]
    git: Option<PathBuf>,

    /// Local checkouts, remote URLs, or (with --recursive) directories to search
    #[arg(required = true, value_name = "TARGET")]
    targets: Vec<OsString>,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();
    event_log::init(Some(CachePaths::new(&config.cache_dir).log_file()));

    match run(cli, &config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every target succeeded. Skipped targets do not count as failures.
fn run(cli: Cli, config: &Config) -> Result<bool, Box<dyn std::error::Error>> {
    let git = populate::locate_git(cli.git)?;

    let targets = if cli.recursive {
        search(&cli.targets)?
    } else {
        cli.targets
    };

    let cache = MirrorCache::new(CachePaths::new(&config.cache_dir), GitCli::new(git))
        .with_lock_timeout(config.lock_timeout);
    cache.ensure_root()?;
    let populator = Populator::new(cache);

    let mut all_ok = true;
    for arg in &targets {
        let result = populate::classify(arg).and_then(|target| match target {
            Some(target) => populator.populate(&target).map(Some),
            None => Ok(None),
        });
        match result {
            Ok(Some(_)) => {}
            Ok(None) => {
                log::warn!("no origin remote in {}, skipping", Path::new(arg).display());
            }
            Err(e) => {
                log::error!("{}: {}", Path::new(arg).display(), e);
                all_ok = false;
            }
        }
    }

    println!("Done.");
    Ok(all_ok)
}

fn search(roots: &[OsString]) -> Result<Vec<OsString>, Box<dyn std::error::Error>> {
    let mut found = Vec::new();
    for root in roots {
        let root = Path::new(root);
        if !root.is_dir() {
            return Err(format!("not a directory: {}", root.display()).into());
        }
        println!("Searching for git repos in: {}", root.display());
        for repo in populate::find_checkouts(root) {
            println!("Found git repo: {}", repo.display());
            found.push(repo.into_os_string());
        }
    }

    if found.is_empty() {
        return Err("no git repos found".into());
    }

    println!("Found {} repo(s), populating cache...", found.len());
    Ok(found)
}
