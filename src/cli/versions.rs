//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了版本查询命令的实现。

use crate::cli::VersionsArgs;
use crate::config::Config;
use crate::manager::{build_store, build_sync};
use anyhow::{Context, Result};
use std::collections::HashMap;

pub async fn execute(args: &VersionsArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let store = build_store(&config).await.context("Failed to connect cache store")?;
    let sync = build_sync(&config, store)?;

    // 客户端版本为 0 的检查结果中已包含当前版本
    let modules = sync.check(&HashMap::new()).await?;

    if args.json {
        let versions: serde_json::Map<String, serde_json::Value> = modules
            .iter()
            .map(|m| (m.module.to_string(), m.version.into()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }

    println!("=== Entity Versions ===\n");
    for module in modules {
        println!("  {:<10} {}", module.module, module.version);
    }
    Ok(())
}
