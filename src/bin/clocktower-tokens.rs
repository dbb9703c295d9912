use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use clocktower_tokens::{
    CacheConfig, CorsProxySetting, Dpi, FontBook, GenerationOptions, HttpImageLoader, ImageCache,
    LoaderConfig, Script, StaticAssetCatalog, TokenGenerator, generate_all_tokens,
};

#[derive(Parser, Debug)]
#[command(name = "clocktower-tokens", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every token of a script as PNG files.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Generation options JSON; defaults are used for missing fields.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Directory of `.ttf` / `.otf` fonts. Falls back to a system face.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Directory of decorative assets (backgrounds, leaves, setup flowers).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Override the output resolution.
    #[arg(long)]
    dpi: Option<u32>,

    /// CORS proxy prefix used when a direct image fetch fails.
    #[arg(long)]
    proxy: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
    }
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = Script::from_path(&args.script)?;
    let mut options = match &args.options {
        Some(path) => GenerationOptions::from_path(path)?,
        None => GenerationOptions::default(),
    };
    if let Some(dpi) = args.dpi {
        options.dpi = Dpi(dpi);
    }

    let mut fonts = FontBook::new();
    if let Some(dir) = &args.fonts {
        let n = fonts.load_dir(dir)?;
        tracing::info!(fonts = n, dir = %dir.display(), "loaded fonts");
    }
    if fonts.is_empty() && !fonts.add_system_fallback() {
        tracing::warn!("no fonts available, tokens will be rendered without text");
    }

    let assets = match &args.assets {
        Some(dir) => StaticAssetCatalog::from_dir(dir)?,
        None => StaticAssetCatalog::default(),
    };

    let mut loader_cfg = LoaderConfig::from_env();
    if let Some(proxy) = args.proxy.filter(|p| !p.trim().is_empty()) {
        loader_cfg.cors_proxy = CorsProxySetting::Endpoint(proxy);
    }
    if loader_cfg.asset_root.is_none() {
        loader_cfg.asset_root = args.script.parent().map(PathBuf::from);
    }
    let cache = ImageCache::new(
        Arc::new(HttpImageLoader::new(loader_cfg)?),
        CacheConfig::default(),
    );

    let generator = TokenGenerator::new(
        options,
        Arc::new(cache),
        Arc::new(fonts),
        Arc::new(assets),
    )?;

    let output = generate_all_tokens(
        &generator,
        &script.characters,
        &mut |p| tracing::info!(completed = p.completed, total = p.total, token = %p.current, "rendered"),
        script.meta.as_ref(),
    )
    .await;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    for token in &output.tokens {
        let path = args.out.join(format!("{}.png", token.filename));
        token.canvas.save_png(&path)?;
    }
    eprintln!(
        "wrote {} token(s) to {}",
        output.tokens.len(),
        args.out.display()
    );

    for failure in &output.failures {
        eprintln!("failed {} ({}): {}", failure.name, failure.kind.as_str(), failure.error);
    }
    if !output.failures.is_empty() {
        anyhow::bail!("{} token(s) failed", output.failures.len());
    }
    Ok(())
}
