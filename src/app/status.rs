use std::fmt::Write as _;

use crate::config::Config;
use crate::core::taste::{
    Attribute, AttributeCategory, AttributePool, PreferenceRecord, StrategyPhase,
};

fn single_value_pool(name: &str, value: &str) -> AttributePool {
    AttributePool::new(name, [value]).unwrap_or_else(|_| unreachable!("pool has one value"))
}

/// Strongest style so far, `plaint` before anything was recorded.
pub fn favorite_style(record: &PreferenceRecord) -> String {
    record
        .style_history
        .top_value(&single_value_pool("style", "plaint"), &mut rand::rng())
}

/// Strongest theme so far, `peaceful` before anything was recorded.
pub fn favorite_theme(record: &PreferenceRecord) -> String {
    record
        .themes
        .top_value(&single_value_pool("theme", "peaceful"), &mut rand::rng())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(fraction: f64) -> u32 {
    (fraction * 100.0).round() as u32
}

fn render_category(out: &mut Vec<String>, attribute: Attribute, category: &AttributeCategory) {
    out.push(format!("  {attribute}"));
    if category.is_empty() {
        out.push("    (nothing yet)".to_string());
        return;
    }
    for (value, stat) in category.iter() {
        let mut line = String::new();
        let _ = write!(
            line,
            "    {value:<18} seen {:>3}  chosen {:>3}  strength {:>3}%",
            stat.seen,
            stat.chosen,
            percent(stat.strength)
        );
        out.push(line);
    }
}

pub fn render_status(config: &Config, record: &PreferenceRecord) -> String {
    let mut lines = vec![
        "◆ Sentience status".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Workspace   {}", config.workspace_dir.display()),
        format!("Config      {}", config.config_path.display()),
        String::new(),
        format!("  Rounds        {}", record.total_generations),
        format!("  Phase         {}", StrategyPhase::for_record(record)),
        format!("  Confidence    {}%", percent(record.confidence_score)),
        format!("  Style         {}", favorite_style(record)),
        format!("  Theme         {}", favorite_theme(record)),
        String::new(),
    ];

    for attribute in [Attribute::Style, Attribute::Theme, Attribute::ColorPalette] {
        render_category(&mut lines, attribute, record.category(attribute));
    }

    lines.join("\n")
}
