//! `passkeeper generate`: print random passwords. Needs no unlock.

use crate::cli::AppContext;
use crate::client::CredentialClient;
use crate::errors::Result;
use crate::generator::GeneratorPolicy;

pub struct GenerateArgs {
    pub length: Option<usize>,
    pub no_uppercase: bool,
    pub no_numbers: bool,
    pub no_symbols: bool,
    pub count: usize,
}

/// Merge command-line flags over the configured defaults.
pub fn policy_from(ctx: &AppContext, args: &GenerateArgs) -> GeneratorPolicy {
    let base = ctx.settings.generator_policy();
    GeneratorPolicy::new(
        args.length.unwrap_or(base.length),
        base.uppercase && !args.no_uppercase,
        base.digits && !args.no_numbers,
        base.symbols && !args.no_symbols,
    )
}

/// Execute the `generate` command.
pub async fn execute(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    let client = CredentialClient::new(ctx.session().await);
    let policy = policy_from(ctx, &args);

    for _ in 0..args.count.max(1) {
        let password = client.generate_with_policy(policy).await?;
        println!("{password}");
    }
    Ok(())
}
