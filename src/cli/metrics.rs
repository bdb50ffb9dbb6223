//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了指标查询命令的实现。
//!
//! 请求与写操作计数只存在于运行中的进程内，一次性命令只能导出从缓存读取的版本号。

use crate::catalog::EntityKind;
use crate::cli::MetricsArgs;
use crate::config::Config;
use crate::manager::{build_store, build_sync};
use crate::metrics::{get_metrics_string, GLOBAL_METRICS};
use anyhow::{Context, Result};
use std::collections::HashMap;

pub async fn execute(args: &MetricsArgs) -> Result<()> {
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let store = build_store(&config).await.context("Failed to connect cache store")?;

    let kinds: Vec<EntityKind> = match &args.entity {
        Some(name) => vec![name
            .parse()
            .with_context(|| format!("Unknown entity type '{}'", name))?],
        None => EntityKind::ALL.to_vec(),
    };

    let modules = build_sync(&config, store)?.check(&HashMap::new()).await?;
    for module in modules.iter().filter(|m| kinds.contains(&m.module)) {
        GLOBAL_METRICS.set_version(module.module.entity_name(), module.version);
    }

    if args.prometheus {
        print!("{}", get_metrics_string());
        return Ok(());
    }

    println!("=== Entity Versions ===\n");
    for module in modules.iter().filter(|m| kinds.contains(&m.module)) {
        println!("{:<12} {}", module.module.entity_name(), module.version);
    }

    Ok(())
}
