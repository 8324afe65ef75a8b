use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Select;

use crate::app::atelier::{Atelier, Choice, RenderedOption, RoundOverrides};
use crate::app::status::render_status;
use crate::cli::{Cli, Commands, GalleryCommands};
use crate::config::Config;
use crate::core::gallery::GalleryLog;
use crate::core::storage::{FileStore, KeyValueStore};
use crate::core::taste::{ArtisticStyle, PreferenceStore};

fn file_storage(config: &Config) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(config.store_dir()))
}

fn print_option(label: &str, option: &RenderedOption) {
    let candidate = &option.candidate;
    let plan = &option.plan;
    println!(
        "{} {}",
        style(format!("◆ Option {label}")).cyan().bold(),
        style(&candidate.style).dim()
    );
    println!(
        "  theme {}  palette {}  frame {}",
        candidate.theme.as_deref().unwrap_or("-"),
        candidate.colors.as_deref().unwrap_or("-"),
        candidate.aspect_ratio
    );
    println!("  \"{}\"", plan.quote);
    println!(
        "  {} / {} on {}, {} aligned, {}",
        plan.hero_font, plan.support_font, plan.layout_type, plan.vertical_align, plan.visual_nuance
    );
}

fn prompt_choice(option_a: &RenderedOption, option_b: &RenderedOption) -> Result<Choice> {
    let items = [
        format!("› A  {}", option_a.plan.quote),
        format!("› B  {}", option_b.plan.quote),
    ];
    let index = Select::new()
        .with_prompt("  Which one speaks to you?")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(if index == 0 { Choice::A } else { Choice::B })
}

async fn run_round(
    config: &Config,
    overrides: RoundOverrides,
    choice: Option<Choice>,
    seed: Option<u64>,
) -> Result<()> {
    let atelier = Atelier::from_config(config, seed)?;

    let pair = match atelier.generate_pair(&overrides).await {
        Ok(pair) => pair,
        Err(e) => bail!("{} ({e})", e.user_message()),
    };

    println!("Round phase: {}", pair.phase);
    println!();
    print_option("A", &pair.option_a);
    println!();
    print_option("B", &pair.option_b);
    println!();

    let choice = match choice {
        Some(choice) => choice,
        None => prompt_choice(&pair.option_a, &pair.option_b)?,
    };

    let outcome = atelier.choose(pair, choice);
    println!(
        "{} Recorded round {} (confidence {:.0}%)",
        style("✓").green().bold(),
        outcome.record.total_generations,
        outcome.record.confidence_score * 100.0
    );
    match outcome.gallery_entry {
        Some(entry) => println!("  Saved {}", entry.image_path.display()),
        None => println!("  Image was not saved; see logs."),
    }
    Ok(())
}

async fn run_create(config: &Config, look: ArtisticStyle, overrides: RoundOverrides) -> Result<()> {
    let atelier = Atelier::from_config(config, None)?;

    let creation = match atelier.create(look, &overrides).await {
        Ok(creation) => creation,
        Err(e) => bail!("{} ({e})", e.user_message()),
    };

    print_option(&look.to_string(), &creation.rendered);
    match creation.gallery_entry {
        Some(entry) => println!(
            "{} Saved {}",
            style("✓").green().bold(),
            entry.image_path.display()
        ),
        None => println!("  Image was not saved; see logs."),
    }
    Ok(())
}

fn run_gallery(config: &Config, command: GalleryCommands) -> Result<()> {
    let gallery = GalleryLog::new(file_storage(config), config.gallery.capacity);
    match command {
        GalleryCommands::List => {
            let entries = gallery.list();
            if entries.is_empty() {
                println!("Gallery is empty.");
                return Ok(());
            }
            println!("Gallery ({}/{}):", entries.len(), gallery.capacity());
            for entry in entries {
                let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
                    .map_or_else(|| "?".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
                println!(
                    "  {}  {when}  {:<16} \"{}\"",
                    entry.id, entry.candidate.style, entry.plan.quote
                );
            }
            Ok(())
        }
        GalleryCommands::Remove { id } => {
            if gallery.remove(id).context("Failed to update gallery")? {
                println!("Removed {id}");
                Ok(())
            } else {
                bail!("No gallery entry with id {id}")
            }
        }
    }
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Suggest { seed } => {
            let atelier = Atelier::from_config(&config, seed)?;
            let pair = atelier.suggest();
            println!(
                "{}",
                serde_json::to_string_pretty(&pair).context("Failed to render pair")?
            );
            Ok(())
        }

        Commands::Round {
            quote,
            scene,
            subject,
            aspect,
            mood,
            choice,
            seed,
        } => {
            let overrides = RoundOverrides {
                quote,
                scene,
                subject,
                aspect_ratio: aspect,
                mood,
            };
            run_round(&config, overrides, choice, seed).await
        }

        Commands::Create {
            style: look,
            mood,
            subject,
            quote,
            aspect,
        } => {
            let overrides = RoundOverrides {
                quote,
                subject,
                aspect_ratio: Some(aspect),
                mood: Some(mood),
                ..RoundOverrides::default()
            };
            run_create(&config, look, overrides).await
        }

        Commands::Status => {
            let record = PreferenceStore::new(file_storage(&config)).load();
            println!("{}", render_status(&config, &record));
            Ok(())
        }

        Commands::Gallery { gallery_command } => run_gallery(&config, gallery_command),

        Commands::Draft { scene } => {
            let atelier = Atelier::from_config(&config, None)?;
            let quote = atelier.draft_quote(&scene).await;
            if quote.is_empty() {
                bail!("Could not draft a quote; see logs");
            }
            println!("{quote}");
            Ok(())
        }

        Commands::Refine { text } => {
            let atelier = Atelier::from_config(&config, None)?;
            println!("{}", atelier.refine_quote(&text).await);
            Ok(())
        }
    }
}
