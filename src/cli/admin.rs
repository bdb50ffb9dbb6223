//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了管理员操作命令的实现。

use crate::catalog::EntityKind;
use crate::cli::PurgeArgs;
use crate::config::Config;
use crate::manager::CatalogManager;
use anyhow::{Context, Result};
use std::io::Write;

pub async fn execute_purge(args: &PurgeArgs) -> Result<()> {
    let kind: EntityKind = args
        .entity
        .parse()
        .with_context(|| format!("Unknown entity type '{}'", args.entity))?;

    if !args.yes {
        print!(
            "Purge the cached collection and all detail entries of '{}'? [y/N]: ",
            kind.entity_name()
        );
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "y" {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let manager = CatalogManager::init(config)
        .await
        .context("Failed to initialize catalog")?;

    let removed = manager.purge(kind).await?;
    println!(
        "Purged '{}': collection dropped, {} detail entries removed. Version unchanged.",
        kind.entity_name(),
        removed
    );
    Ok(())
}
