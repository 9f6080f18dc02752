mod assemble;
mod backend;
mod catalog;
mod cli;
mod config;
mod cron;
mod db;
mod drills;
mod error;
mod export;
mod generator;
mod logging;
mod post;
mod publish;
mod scheduler;
mod theme;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use clap::error::ErrorKind;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{error, info};

use crate::cli::Cli;
use crate::config::Config;
use crate::generator::BlogGenerator;
use crate::scheduler::{Schedule, Scheduler, SchedulerState};
use crate::theme::Bucket;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let code = match run(cli).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            error!(error = %e, "Blog generator failed");
            eprintln!("Error: {e:#}");
            1
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<bool> {
    // Config problems abort before anything touches the disk
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    logging::init(&cli.log_file)?;
    info!(log_file = %cli.log_file, "Blog generator started");

    if cli.setup_cron {
        setup_cron(&config)?;
        return Ok(true);
    }

    if let Some(path) = &cli.export_index {
        let conn = db::open(&config.ledger_path)?;
        let count = export::export_json(&conn, path)?;
        info!(path = %path, count, "Exported post index");
        return Ok(true);
    }

    let mut generator = BlogGenerator::new(&config, cli.publish).await?;

    if !cli.has_mode() {
        return interactive(&config, &mut generator).await;
    }

    if let Some(bucket) = cli.immediate {
        return Ok(generator.generate_for_slot(bucket).await);
    }

    if let Some(theme) = &cli.theme {
        return Ok(generator.generate_and_deliver(Some(theme)).await);
    }

    if let Some(count) = cli.batch {
        let count = count as usize;
        return Ok(generator.generate_batch(count).await == count);
    }

    start_scheduler(&config, &mut generator).await?;
    Ok(true)
}

async fn start_scheduler(config: &Config, generator: &mut BlogGenerator) -> Result<()> {
    let schedule = Schedule::from_config(&config.schedule)?;
    let mut scheduler = Scheduler::new(
        schedule,
        Duration::from_secs(config.schedule.poll_interval_secs),
        Local::now().naive_local(),
        SchedulerState::default(),
    );

    println!("Starting scheduler... Press Ctrl+C to stop");
    scheduler.run(generator).await
}

fn setup_cron(config: &Config) -> Result<()> {
    let schedule = Schedule::from_config(&config.schedule)?;
    let written = cron::write_setup(&schedule, &config.cron, &config.site.name)?;

    for path in &written {
        println!("Wrote {}", path.display());
    }
    println!("\nTo set up the cron schedule:");
    println!("1. Run: crontab -e");
    println!("2. Copy the contents of {} into your crontab", cron::CRONTAB_FILE);
    println!("3. Save and exit");

    Ok(())
}

async fn interactive(config: &Config, generator: &mut BlogGenerator) -> Result<bool> {
    println!("{} Tennis Blog Generator", config.site.name);
    println!("=====================================");
    println!("Website: {}", config.site.url);
    println!("Database: {}", config.site.database_url);
    println!("Rackets loaded: {}", generator.catalog().len());

    loop {
        println!("\nOptions:");
        println!("1. Start scheduler (continuous)");
        println!("2. Generate morning post");
        println!("3. Generate afternoon post");
        println!("4. Generate evening post");
        println!("5. Generate batch of posts");
        println!("6. Setup cron jobs");
        println!("7. Exit");

        let Some(choice) = prompt("\nEnter your choice (1-7): ")? else {
            return Ok(true);
        };

        match choice.as_str() {
            "1" => start_scheduler(config, generator).await?,
            "2" => report(generator.generate_for_slot(Bucket::Morning).await),
            "3" => report(generator.generate_for_slot(Bucket::Afternoon).await),
            "4" => report(generator.generate_for_slot(Bucket::Evening).await),
            "5" => {
                let Some(answer) = prompt("How many posts? ")? else {
                    return Ok(true);
                };
                match answer.parse::<usize>() {
                    Ok(count) if count > 0 => {
                        let delivered = generator.generate_batch(count).await;
                        println!("Delivered {} of {} posts", delivered, count);
                    }
                    _ => println!("Please enter a positive number."),
                }
            }
            "6" => {
                if let Err(e) = setup_cron(config) {
                    error!(error = %e, "Cron setup failed");
                }
            }
            "7" => {
                println!("Goodbye!");
                return Ok(true);
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn report(ok: bool) {
    if ok {
        println!("Post generated.");
    } else {
        println!("Post generation failed, see the log for details.");
    }
}

// None on end of input
fn prompt(text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
