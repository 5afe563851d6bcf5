//! `voxintent doctor`: Check the config, credentials and default provider.

use voxintent_config::AppConfig;
use voxintent_core::provider::Provider;
use voxintent_providers::router;

/// One diagnostic line.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub ok: bool,
    pub message: String,
}

impl Check {
    fn pass(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into() }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("voxintent doctor");
    println!("================\n");

    let checks = match AppConfig::load() {
        Ok(config) => {
            let mut checks = vec![Check::pass("Config file valid")];
            let providers = router::build_from_config(&config);
            let provider = providers.default();
            checks.extend(diagnose(&config, provider.as_deref()).await);
            checks
        }
        Err(e) => vec![Check::fail(format!("Config file invalid: {e}"))],
    };

    for check in &checks {
        let mark = if check.ok { "✅" } else { "❌" };
        println!("  {mark} {}", check.message);
    }

    let issues = checks.iter().filter(|c| !c.ok).count();
    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Everything after config loading; `provider` is the router's default.
pub async fn diagnose(config: &AppConfig, provider: Option<&dyn Provider>) -> Vec<Check> {
    let name = &config.default_provider;
    let model = router::default_model(config);
    let mut checks = Vec::new();

    if router::missing_api_key(config) {
        checks.push(Check::fail(format!(
            "No API key for '{name}': set api_key or [providers.{name}].api_key"
        )));
    } else {
        checks.push(Check::pass(format!("Credentials resolved for '{name}'")));
    }

    let catalog = config.actions.len() + config.tools.len();
    if catalog == 0 {
        checks.push(Check::fail(
            "No actions or tools configured: every utterance passes through as continue",
        ));
    } else {
        checks.push(Check::pass(format!("{catalog} action(s) in the catalog")));
    }

    let Some(provider) = provider else {
        checks.push(Check::fail(format!(
            "Provider '{name}' has no api_url and is not a known provider"
        )));
        return checks;
    };

    match provider.health_check().await {
        Ok(true) => checks.push(Check::pass(format!("Provider '{name}' reachable"))),
        Ok(false) => {
            checks.push(Check::fail(format!("Provider '{name}' rejected the request")));
            return checks;
        }
        Err(e) => {
            checks.push(Check::fail(format!("Provider '{name}' unreachable: {e}")));
            return checks;
        }
    }

    match provider.list_models().await {
        // Some gateways do not publish a model list.
        Ok(models) if models.is_empty() => {
            checks.push(Check::pass(format!("Model list unavailable, using '{model}' as configured")))
        }
        Ok(models) if models.iter().any(|m| *m == model) => {
            checks.push(Check::pass(format!("Model '{model}' offered")))
        }
        Ok(models) => checks.push(Check::fail(format!(
            "Model '{model}' not offered; {} other model(s) available",
            models.len()
        ))),
        Err(e) => checks.push(Check::fail(format!("Listing models failed: {e}"))),
    }

    checks
}
