//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了版本同步检查命令的实现。

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::manager::{build_store, build_sync};
use crate::sync::VersionCheckRequest;
use anyhow::{Context, Result};

pub async fn execute(args: &CheckArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let store = build_store(&config).await.context("Failed to connect cache store")?;
    let sync = build_sync(&config, store)?;

    let request = VersionCheckRequest {
        service_version: args.service,
        story_version: args.story,
        category_version: args.category,
    };
    let modules = sync.check_versions(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&modules)?);
        return Ok(());
    }

    for module in &modules {
        let marker = if module.has_changed { "changed" } else { "up to date" };
        println!(
            "  {:<10} version={:<6} {}",
            module.module, module.version, marker
        );
    }
    Ok(())
}
