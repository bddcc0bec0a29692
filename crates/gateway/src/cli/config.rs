use nb_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing any issues.
///
/// Returns `false` when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!(
        "\n{} error(s), {} warning(s) in {config_path}",
        error_count, warning_count,
    );

    error_count == 0
}

/// Render the resolved config (all defaults filled in) as TOML, with the
/// admin token masked.
pub fn render(config: &Config) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.admin.token.is_some() {
        shown.admin.token = Some("********".into());
    }
    toml::to_string_pretty(&shown)
}

/// Dump the resolved config as TOML.
pub fn show(config: &Config) {
    match render(config) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_masks_admin_token() {
        let mut config = Config::default();
        config.admin.token = Some("hunter2".into());
        let out = render(&config).unwrap();
        assert!(!out.contains("hunter2"));
        assert!(out.contains("********"));
    }

    #[test]
    fn default_config_validates() {
        assert!(validate(&Config::default(), "config.toml"));
    }
}
