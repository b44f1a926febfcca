use clap::Parser;
use pagemark::error::Result;
use pagemark::init::{initialize_from_env, PagemarkContext};
use pagemark::model::{Setting, SettingValue};
use tracing_subscriber::EnvFilter;

mod args;
mod cli;
use args::{Cli, Commands};
use cli::print::{
    print_folders, print_heading, print_load_issues, print_positions, print_setting,
    print_warnings,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut ctx = initialize_from_env()?;
    print_load_issues(ctx.settings.load_issues());

    match cli.command {
        Some(Commands::Show) | None => handle_show(&ctx),
        Some(Commands::Position { document }) => handle_position(&ctx, &document),
        Some(Commands::Record { document, page }) => handle_record(&mut ctx, &document, page),
        Some(Commands::Folders) => handle_folders(&ctx),
        Some(Commands::Folder { path }) => handle_folder(&mut ctx, &path),
        Some(Commands::Get { key }) => handle_get(&ctx, &key),
        Some(Commands::Set { key, value }) => handle_set(&mut ctx, &key, &value),
        Some(Commands::Paths) => handle_paths(&ctx),
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "pagemark=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_show(ctx: &PagemarkContext) -> Result<()> {
    print_heading("Settings");
    for setting in Setting::ALL {
        print_setting(setting, &ctx.settings.get(setting));
    }
    println!();
    print_heading("Recent folders");
    print_folders(&ctx.settings.recent_folders());
    println!();
    print_heading("Positions");
    print_positions(ctx.settings.positions());
    Ok(())
}

fn handle_position(ctx: &PagemarkContext, document: &str) -> Result<()> {
    println!("{}", ctx.settings.position_of(document));
    Ok(())
}

fn handle_record(ctx: &mut PagemarkContext, document: &str, page: i64) -> Result<()> {
    let outcome = ctx.settings.record_position(document, page)?;
    print_warnings(&outcome);
    Ok(())
}

fn handle_folders(ctx: &PagemarkContext) -> Result<()> {
    print_folders(&ctx.settings.recent_folders());
    Ok(())
}

fn handle_folder(ctx: &mut PagemarkContext, path: &str) -> Result<()> {
    let outcome = ctx.settings.record_recent_folder(path);
    print_warnings(&outcome);
    Ok(())
}

fn handle_get(ctx: &PagemarkContext, key: &str) -> Result<()> {
    let setting: Setting = key.parse()?;
    println!("{}", ctx.settings.get(setting));
    Ok(())
}

fn handle_set(ctx: &mut PagemarkContext, key: &str, value: &str) -> Result<()> {
    let setting: Setting = key.parse()?;
    let value = SettingValue::parse(setting, value)?;
    let outcome = ctx.settings.set(setting, value)?;
    print_warnings(&outcome);
    Ok(())
}

fn handle_paths(ctx: &PagemarkContext) -> Result<()> {
    println!("device  {}", ctx.paths.device_file().display());
    println!("shared  {}", ctx.paths.shared_file().display());
    Ok(())
}
