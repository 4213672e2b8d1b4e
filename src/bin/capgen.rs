//! Capability registry driver.
//!
//! `generate` renders the type definition and loading logic for a registry,
//! `schema` prints the JSON Schema a capabilities or enable document must
//! follow, `check` runs both loading phases over real documents and prints
//! the effective capabilities, and `load` does the same for whole documents
//! (scenes, settings, adaptations and capabilities).

use anyhow::{Context, Result, anyhow, bail};
use capgen::{
    CapabilitiesFile, CapabilitySnapshot, DocumentKind, DocumentValidator, EnableFile,
    EnableSource, GeneratorOptions, Registry, generate, read_json_file, render_document_schema,
    write_artifact,
};
use serde_json::Value;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_logging();
    if let Err(err) = run(env::args_os().skip(1)) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_ansi(env::var_os("NO_COLOR").is_none()),
        )
        .with(filter)
        .init();
}

fn run(args: impl Iterator<Item = OsString>) -> Result<()> {
    match Command::parse(args)? {
        Command::Generate(args) => run_generate(&args),
        Command::Schema { registry, kind } => {
            let registry = Registry::load(&registry)?;
            let schema = render_document_schema(&registry, kind);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Check(args) => {
            let effective = run_check(&args)?;
            println!("{}", serde_json::to_string_pretty(&effective.to_document())?);
            Ok(())
        }
        Command::Load(args) => {
            let loaded = run_load(&args)?;
            println!("{}", serde_json::to_string_pretty(&loaded)?);
            Ok(())
        }
        Command::Help => {
            print!("{}", usage());
            Ok(())
        }
    }
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let registry = Registry::load(&args.registry)?;
    // Both artifacts are rendered before either is written.
    let artifacts = generate(&registry, &args.options);
    let outputs = [
        (&args.types_out, &artifacts.types),
        (&args.logic_out, &artifacts.logic),
    ];
    for (path, contents) in outputs {
        if write_artifact(path, contents)? {
            tracing::info!(path = %path.display(), "wrote generated artifact");
        } else {
            tracing::info!(path = %path.display(), "generated artifact unchanged");
        }
    }
    Ok(())
}

fn run_check(args: &CheckArgs) -> Result<CapabilitySnapshot> {
    let registry = Registry::load(&args.registry)?;

    let capabilities = read_json_file(&args.capabilities)?;
    validate(&registry, DocumentKind::Capabilities, &capabilities, &args.capabilities)?;
    let base = CapabilitySnapshot::load_base(&registry, &capabilities)
        .with_context(|| format!("loading {}", args.capabilities.display()))?;
    tracing::debug!(present = base.len(), "loaded capabilities file");

    let Some((enable, origin)) = read_enable(&args.enable)? else {
        return Ok(base);
    };
    validate(&registry, DocumentKind::Enable, &enable, Path::new(&origin))?;
    let effective = CapabilitySnapshot::load_effective(&registry, &base, &enable, args.defaults)
        .with_context(|| format!("applying enable document from {origin}"))?;
    tracing::debug!(present = effective.len(), "applied enable document");
    Ok(effective)
}

/// Whole-document variant of `check`: prints the enable file, or the
/// capabilities file when there is no enable document.
fn run_load(args: &CheckArgs) -> Result<Value> {
    let registry = Registry::load(&args.registry)?;

    let capabilities = read_json_file(&args.capabilities)?;
    validate(&registry, DocumentKind::Capabilities, &capabilities, &args.capabilities)?;
    let base = CapabilitiesFile::load(&registry, &capabilities)
        .with_context(|| format!("loading {}", args.capabilities.display()))?;

    let Some((enable, origin)) = read_enable(&args.enable)? else {
        return Ok(base.to_document());
    };
    validate(&registry, DocumentKind::Enable, &enable, Path::new(&origin))?;
    let enabled = EnableFile::load(&registry, &base, &enable, args.defaults)
        .with_context(|| format!("applying enable document from {origin}"))?;
    Ok(enabled.to_document())
}

/// The enable document and where it came from, if one was requested.
fn read_enable(arg: &EnableArg) -> Result<Option<(Value, String)>> {
    match arg {
        EnableArg::None => Ok(None),
        EnableArg::Path(path) => Ok(Some((read_json_file(path)?, path.display().to_string()))),
        EnableArg::FromEnv => match EnableSource::from_env()?.read()? {
            Some(document) => Ok(Some((document, "environment".to_string()))),
            None => {
                tracing::info!("no enable document in environment; using capabilities file");
                Ok(None)
            }
        },
    }
}

fn validate(registry: &Registry, kind: DocumentKind, document: &Value, origin: &Path) -> Result<()> {
    let validator = DocumentValidator::compile(registry, kind)?;
    if let Err(errors) = validator.validate(document) {
        bail!(
            "{} does not match the {kind} document schema:\n  {}",
            origin.display(),
            errors.join("\n  ")
        );
    }
    Ok(())
}

#[derive(Debug)]
enum Command {
    Generate(GenerateArgs),
    Schema { registry: PathBuf, kind: DocumentKind },
    Check(CheckArgs),
    Load(CheckArgs),
    Help,
}

#[derive(Debug)]
struct GenerateArgs {
    registry: PathBuf,
    types_out: PathBuf,
    logic_out: PathBuf,
    options: GeneratorOptions,
}

#[derive(Debug)]
struct CheckArgs {
    registry: PathBuf,
    capabilities: PathBuf,
    enable: EnableArg,
    defaults: bool,
}

#[derive(Debug, PartialEq)]
enum EnableArg {
    None,
    Path(PathBuf),
    FromEnv,
}

impl Command {
    fn parse(args: impl Iterator<Item = OsString>) -> Result<Self> {
        let mut args = args;
        let Some(sub) = args.next() else {
            bail!("missing subcommand\n{}", usage());
        };
        let sub = sub
            .into_string()
            .map_err(|_| anyhow!("subcommand is not valid UTF-8"))?;
        match sub.as_str() {
            "generate" => parse_generate(args).map(Command::Generate),
            "schema" => parse_schema(args),
            "check" => parse_check(args, "check").map(Command::Check),
            "load" => parse_check(args, "load").map(Command::Load),
            "--help" | "-h" | "help" => Ok(Command::Help),
            other => bail!("unknown subcommand: {other}\n{}", usage()),
        }
    }
}

fn parse_generate(mut args: impl Iterator<Item = OsString>) -> Result<GenerateArgs> {
    let mut registry = None;
    let mut types_out = None;
    let mut logic_out = None;
    let mut options = GeneratorOptions::default();

    while let Some(arg) = next_flag(&mut args)? {
        match arg.as_str() {
            "--registry" => registry = Some(PathBuf::from(next_value(&mut args, "--registry")?)),
            "--types-out" => types_out = Some(PathBuf::from(next_value(&mut args, "--types-out")?)),
            "--logic-out" => logic_out = Some(PathBuf::from(next_value(&mut args, "--logic-out")?)),
            "--runtime-path" => options.runtime_path = next_value(&mut args, "--runtime-path")?,
            "--types-path" => options.types_path = next_value(&mut args, "--types-path")?,
            "--logic-module" => {
                let module = next_value(&mut args, "--logic-module")?;
                if !capgen::CapabilityName::is_valid_identifier(&module) {
                    bail!("--logic-module must be a Rust identifier, got '{module}'");
                }
                options.logic_module = Some(module);
            }
            other => bail!("unknown flag for generate: {other}"),
        }
    }

    Ok(GenerateArgs {
        registry: registry.ok_or_else(|| anyhow!("generate requires --registry"))?,
        types_out: types_out.ok_or_else(|| anyhow!("generate requires --types-out"))?,
        logic_out: logic_out.ok_or_else(|| anyhow!("generate requires --logic-out"))?,
        options,
    })
}

fn parse_schema(mut args: impl Iterator<Item = OsString>) -> Result<Command> {
    let mut registry = None;
    let mut kind = None;
    while let Some(arg) = next_flag(&mut args)? {
        match arg.as_str() {
            "--registry" => registry = Some(PathBuf::from(next_value(&mut args, "--registry")?)),
            "--kind" => kind = Some(DocumentKind::parse(&next_value(&mut args, "--kind")?)?),
            other => bail!("unknown flag for schema: {other}"),
        }
    }
    Ok(Command::Schema {
        registry: registry.ok_or_else(|| anyhow!("schema requires --registry"))?,
        kind: kind.ok_or_else(|| anyhow!("schema requires --kind"))?,
    })
}

fn parse_check(mut args: impl Iterator<Item = OsString>, sub: &str) -> Result<CheckArgs> {
    let mut registry = None;
    let mut capabilities = None;
    let mut enable = EnableArg::None;
    let mut defaults = true;

    while let Some(arg) = next_flag(&mut args)? {
        match arg.as_str() {
            "--registry" => registry = Some(PathBuf::from(next_value(&mut args, "--registry")?)),
            "--capabilities" => {
                capabilities = Some(PathBuf::from(next_value(&mut args, "--capabilities")?))
            }
            "--enable" => {
                let path = next_value(&mut args, "--enable")?;
                if enable != EnableArg::None {
                    bail!("--enable/--enable-from-env may only be provided once");
                }
                enable = EnableArg::Path(PathBuf::from(path));
            }
            "--enable-from-env" => {
                if enable != EnableArg::None {
                    bail!("--enable/--enable-from-env may only be provided once");
                }
                enable = EnableArg::FromEnv;
            }
            "--no-defaults" => defaults = false,
            other => bail!("unknown flag for {sub}: {other}"),
        }
    }

    Ok(CheckArgs {
        registry: registry.ok_or_else(|| anyhow!("{sub} requires --registry"))?,
        capabilities: capabilities.ok_or_else(|| anyhow!("{sub} requires --capabilities"))?,
        enable,
        defaults,
    })
}

fn next_flag(args: &mut impl Iterator<Item = OsString>) -> Result<Option<String>> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))
        })
        .transpose()
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage:\n  \
capgen generate --registry PATH --types-out PATH --logic-out PATH [--runtime-path PATH] [--types-path PATH] [--logic-module NAME]\n  \
capgen schema --registry PATH --kind capabilities|enable\n  \
capgen check --registry PATH --capabilities PATH [--enable PATH|--enable-from-env] [--no-defaults]\n  \
capgen load --registry PATH --capabilities PATH [--enable PATH|--enable-from-env] [--no-defaults]\n\
Logging is controlled by RUST_LOG (default: warn). --enable-from-env reads CAPGEN_ENABLE_PATH or CAPGEN_ENABLE_JSON.\n"
}
