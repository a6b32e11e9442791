use clap::Parser;
use klinex_common::{init_logging, AppConfig};

/// AI-assisted large file cleaner with a local web UI
#[derive(Parser, Debug)]
#[command(name = "klinex", version, about)]
struct Args {
    /// Address to listen on (default 127.0.0.1:8501)
    #[arg(long)]
    bind: Option<String>,

    /// Default directory to scan
    #[arg(long)]
    path: Option<std::path::PathBuf>,

    /// Default Gemini model
    #[arg(long)]
    model: Option<String>,

    /// Default number of largest files to show (10-500)
    #[arg(long)]
    top_n: Option<usize>,

    /// Default minimum file size in MB (10-1000)
    #[arg(long)]
    min_size_mb: Option<u64>,

    /// Concurrent AI requests
    #[arg(long)]
    workers: Option<usize>,

    /// Log trash operations without moving anything
    #[arg(long)]
    dry_run: bool,

    /// Do not open a browser window on startup
    #[arg(long)]
    no_browser: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, cfg: &mut AppConfig) {
        if let Some(bind) = self.bind {
            cfg.bind = bind;
        }
        if let Some(path) = self.path {
            cfg.default_scan_path = path;
        }
        if let Some(model) = self.model {
            cfg.model = model;
        }
        if let Some(top_n) = self.top_n {
            cfg.top_n = top_n;
        }
        if let Some(min) = self.min_size_mb {
            cfg.min_size_mb = min;
        }
        if let Some(workers) = self.workers {
            cfg.max_workers = workers;
        }
        cfg.dry_run |= self.dry_run;
        if self.no_browser {
            cfg.open_browser = false;
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = AppConfig::from_env().and_then(|mut cfg| {
        args.apply(&mut cfg);
        cfg.validate()?;
        klinex_web::run(cfg)
    });

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
