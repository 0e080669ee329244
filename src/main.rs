/// Replays a scripted drawing session and prints the resulting GeoJSON.
///
/// Usage: `geosketch-replay <script.json> [--config <file>] [--svg <out.svg>]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct Args {
    script: std::path::PathBuf,
    config: Option<std::path::PathBuf>,
    svg: Option<std::path::PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut script = None;
    let mut config = None;
    let mut svg = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config needs a file"))?;
                config = Some(path.into());
            }
            "--svg" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--svg needs a file"))?;
                svg = Some(path.into());
            }
            "-h" | "--help" => {
                println!("Usage: geosketch-replay <script.json> [--config <file>] [--svg <out.svg>]");
                std::process::exit(0);
            }
            other if script.is_none() => script = Some(other.into()),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }

    Ok(Args {
        script: script.ok_or_else(|| anyhow::anyhow!("missing script file"))?,
        config,
        svg,
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use geosketch::config::SketchConfig;
    use geosketch::replay::{Script, replay};

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;

    let config = match &args.config {
        Some(path) => SketchConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SketchConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let json = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let script = Script::from_json(&json).context("parsing script")?;

    let outcome = replay(&script, config);
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(path) = &args.svg {
        std::fs::write(path, &outcome.svg)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("🖼️ Wrote {}", path.display());
    }
    Ok(())
}

// The library is used directly on wasm
#[cfg(target_arch = "wasm32")]
fn main() {}
