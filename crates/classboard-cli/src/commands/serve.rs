//! Development server command.

use anyhow::Result;
use clap::Args;
use classboard_api::MemoryBackend;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3040")]
    pub port: u16,

    /// Seed a demo group with sprints and work items
    #[arg(long)]
    pub seed: bool,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to .classboard/serve.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let backend = if args.seed {
        MemoryBackend::demo()
    } else {
        // Empty board for group 1, led by person 1
        let backend = MemoryBackend::new();
        backend.add_group(1, 1, Vec::new());
        backend
    };

    println!();
    println!("  {} {}", "Classboard".cyan().bold(), "Dev Server".bold());
    println!();
    println!("  {}       http://127.0.0.1:{}/api", "API".green(), args.port);
    println!("  {}  ws://127.0.0.1:{}/ws", "WebSocket".green(), args.port);
    if args.seed {
        println!("  {}       demo group 1, leader is person 1", "Data".green());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    classboard_web::run_server(Arc::new(backend), args.port).await?;

    Ok(())
}
