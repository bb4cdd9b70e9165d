//! `check`: load and validate a configuration file.
use tracing::{info, warn};

use crate::{cli::CheckArgs, error::Result};

/// Run the `check` subcommand.
pub fn run(args: &CheckArgs) -> Result<()> {
    let cfg = config::load_from_path(&args.config)?;
    for (name, scheme) in &cfg.schemes {
        info!(
            scheme = %name,
            guid_match = %scheme.guid_match,
            rules = scheme.rules.len(),
            "scheme"
        );
        for rule in &scheme.rules {
            if cfg.actions.get(rule.action_id).is_none() {
                warn!(
                    scheme = %name,
                    action_id = rule.action_id,
                    "rule refers to an unbound action id"
                );
            }
        }
    }
    if args.dump {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
    } else {
        println!(
            "{}: ok ({} schemes, {} actions)",
            args.config.display(),
            cfg.schemes.len(),
            cfg.actions.len()
        );
    }
    Ok(())
}
