use std::ffi::OsString;

use git_clone_cache::cache::CachePaths;
use git_clone_cache::delegate::FAILURE_EXIT_CODE;
use git_clone_cache::wrapper::Wrapper;
use git_clone_cache::{Config, event_log, locate};

// Arguments are forwarded untouched, so there is no argument parser here.
fn main() {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let config = Config::from_env();

    let git = match locate::find_real_git_from_env() {
        Ok(git) => git,
        Err(e) => {
            event_log::init(None);
            log::error!("{}", e);
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };

    event_log::init(Some(CachePaths::new(&config.cache_dir).log_file()));

    match Wrapper::new(git, &config).run(&args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(FAILURE_EXIT_CODE);
        }
    }
}
