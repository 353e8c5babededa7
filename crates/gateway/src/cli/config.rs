//! `searchrelay config` subcommands.

use std::net::SocketAddr;
use std::path::Path;

use sr_domain::config::Config;

/// Validate the loaded config, printing findings to stdout.
///
/// Returns `false` if any hard error was found (caller exits non-zero).
pub fn validate(config: &Config, path: &Path) -> bool {
    let mut ok = true;

    println!("config: {}", path.display());

    if config.server.bind.parse::<SocketAddr>().is_err() {
        println!("  ERROR server.bind is not a valid socket address: {}", config.server.bind);
        ok = false;
    }
    if config.relay.max_results == 0 {
        println!("  ERROR relay.max_results must be at least 1");
        ok = false;
    }
    if config.search.pool_limit < config.relay.max_results {
        println!(
            "  WARN  search.pool_limit ({}) is below relay.max_results ({}); ranking has nothing to trim",
            config.search.pool_limit, config.relay.max_results
        );
    }

    for (env, what) in [
        (&config.server.api_token_env, "API auth (dev mode if unset)"),
        (&config.store.token_env, "config store"),
        (&config.search.token_env, "search index"),
        (&config.completion.api_key_env, "completion service"),
    ] {
        match Config::secret(env) {
            Some(_) => println!("  ok    {env} is set ({what})"),
            None => println!("  WARN  {env} is not set ({what})"),
        }
    }

    println!("{}", if ok { "valid" } else { "INVALID" });
    ok
}

/// Print the effective config as TOML. Secrets live in env vars, so the
/// output is safe to paste into an issue.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(s) => print!("{s}"),
        Err(e) => eprintln!("failed to render config: {e}"),
    }
}
