use clap::Parser;
use passkeeper::cli::commands;
use passkeeper::cli::commands::add::AddArgs;
use passkeeper::cli::commands::edit::EditArgs;
use passkeeper::cli::commands::generate::GenerateArgs;
use passkeeper::cli::{AppContext, Cli, Commands};
use passkeeper::errors::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        passkeeper::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // These two need neither settings nor a data directory.
    match cli.command {
        Commands::Version => return commands::version::execute(),
        Commands::Completions { shell } => return commands::completions::execute(shell),
        _ => {}
    }

    let ctx = AppContext::load(&cli)?;
    passkeeper::logging::init(&ctx.settings.log_level);

    match cli.command {
        Commands::Init => commands::init::execute(&ctx).await,
        Commands::List => commands::list::execute(&ctx).await,
        Commands::Get { ref id, show, copy } => commands::get::execute(&ctx, id, show, copy).await,
        Commands::Add {
            title,
            username,
            url,
            notes,
            generate,
            length,
        } => {
            let args = AddArgs {
                title,
                username,
                url,
                notes,
                generate,
                length,
            };
            commands::add::execute(&ctx, args).await
        }
        Commands::Edit {
            ref id,
            title,
            username,
            url,
            notes,
            password,
            generate,
        } => {
            let args = EditArgs {
                title,
                username,
                url,
                notes,
                prompt_password: password,
                generate,
            };
            commands::edit::execute(&ctx, id, args).await
        }
        Commands::Delete { ref id, force } => commands::delete::execute(&ctx, id, force).await,
        Commands::Search { ref query } => commands::search::execute(&ctx, query).await,
        Commands::Generate {
            length,
            no_uppercase,
            no_numbers,
            no_symbols,
            count,
        } => {
            let args = GenerateArgs {
                length,
                no_uppercase,
                no_numbers,
                no_symbols,
                count,
            };
            commands::generate::execute(&ctx, args).await
        }
        Commands::Account { action } => commands::account::execute(&ctx, action).await,
        Commands::Shell => commands::shell::execute(&ctx).await,
        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}
