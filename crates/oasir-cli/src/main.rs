use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::info;

use oasir_core::config::{self, CONFIG_FILE_NAME, OasirConfig};
use oasir_core::ir::{IrSpec, ModelKind};
use oasir_core::parse::{self, spec::OpenApiSpec};
use oasir_core::validate::{self, ValidationIssue, ValidationPolicy};
use oasir_core::{TransformOptions, transform_with_options};

#[derive(Parser)]
#[command(name = "oasir", about = "OpenAPI 3.x schema resolver", version)]
struct Cli {
    /// Path to the project config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an OpenAPI spec and report problems
    Validate {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Fail on any error-level issue
        #[arg(long)]
        strict: bool,
    },

    /// Resolve an OpenAPI spec and print its IR
    Inspect {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Print names and kinds only
        #[arg(long)]
        summary: bool,
    },

    /// Initialize a new oasir configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input, strict } => cmd_validate(&cli.config, input, strict),

        Commands::Inspect {
            input,
            format,
            summary,
        } => cmd_inspect(&cli.config, input, format, summary),

        Commands::Init { force } => cmd_init(&cli.config, force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oasir", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<OasirConfig> {
    let cfg = config::load_config(path).map_err(|e| anyhow::anyhow!(e))?;
    if cfg.is_some() {
        info!("loaded config from {}", path.display());
    }
    Ok(cfg.unwrap_or_default())
}

fn load_spec(input: Option<PathBuf>, cfg: &OasirConfig) -> Result<OpenApiSpec> {
    let path = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    parse::load_file(&path).with_context(|| format!("failed to load {}", path.display()))
}

fn resolve(spec: &OpenApiSpec, cfg: &OasirConfig) -> Result<IrSpec> {
    resolve_with(spec, &TransformOptions::from(cfg))
}

fn resolve_with(spec: &OpenApiSpec, options: &TransformOptions) -> Result<IrSpec> {
    let ir = transform_with_options(spec, options).context("failed to resolve spec")?;
    Ok(ir)
}

/// Validate and report once, then resolve without a second validation pass.
fn check(spec: &OpenApiSpec, cfg: &OasirConfig) -> Result<(Vec<ValidationIssue>, IrSpec)> {
    let issues = validate::validate(spec);
    for issue in &issues {
        eprintln!("  {issue}");
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 && cfg.validation == ValidationPolicy::Strict {
        anyhow::bail!("validation failed with {errors} error(s)");
    }

    let options = TransformOptions {
        skip_validation: true,
        ..TransformOptions::from(cfg)
    };
    let ir = resolve_with(spec, &options)?;
    Ok((issues, ir))
}

fn cmd_validate(config_path: &Path, input: Option<PathBuf>, strict: bool) -> Result<()> {
    let mut cfg = load_config(config_path)?;
    if strict {
        cfg.validation = ValidationPolicy::Strict;
    }
    let spec = load_spec(input, &cfg)?;

    eprintln!("OpenAPI {} spec: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());

    let (issues, ir) = check(&spec, &cfg)?;
    let errors = issues.iter().filter(|i| i.is_error()).count();
    eprintln!("  Models: {}", ir.models.len());
    eprintln!("  Operations: {}", ir.operations().count());
    eprintln!(
        "Validation finished: {} error(s), {} warning(s).",
        errors,
        issues.len() - errors
    );
    Ok(())
}

fn cmd_inspect(
    config_path: &Path,
    input: Option<PathBuf>,
    format: InspectFormat,
    summary: bool,
) -> Result<()> {
    let cfg = load_config(config_path)?;
    let spec = load_spec(input, &cfg)?;
    let ir = resolve(&spec, &cfg)?;

    let value = if summary {
        build_inspect_summary(&ir)
    } else {
        serde_json::to_value(&ir)?
    };

    match format {
        InspectFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&value)?),
        InspectFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}

fn model_kind(kind: &ModelKind) -> &'static str {
    match kind {
        ModelKind::Object => "object",
        ModelKind::Array { .. } => "array",
        ModelKind::Enum(_) => "enum",
        ModelKind::Primitive { .. } => "primitive",
        ModelKind::Untyped => "untyped",
    }
}

fn build_inspect_summary(ir: &IrSpec) -> serde_json::Value {
    let models: Vec<serde_json::Value> = ir
        .models
        .iter()
        .map(|m| {
            serde_json::json!({
                "name": m.class_name,
                "kind": model_kind(&m.kind),
                "parent": m.parent,
            })
        })
        .collect();

    let groups: Vec<serde_json::Value> = ir
        .operation_groups
        .iter()
        .map(|g| {
            let operations: Vec<serde_json::Value> = g
                .operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "operationId": op.operation_id,
                        "method": op.http_method.as_str(),
                        "path": op.path,
                        "returnType": op.return_type(),
                    })
                })
                .collect();
            serde_json::json!({ "className": g.class_name, "operations": operations })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "models": models,
        "operationGroups": groups,
    })
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r##"
openapi: "3.0.3"
info: { title: Mini, version: "2" }
paths:
  /users/{id}:
    get:
      operationId: getUser
      tags: [users]
      parameters:
        - { name: id, in: path, required: true, schema: { type: string } }
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { $ref: "#/components/schemas/User" }
components:
  schemas:
    User:
      type: object
      properties:
        name: { type: string }
"##;

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        cmd_init(&path, false).unwrap();
        assert!(cmd_init(&path, false).is_err());
        cmd_init(&path, true).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.input, "openapi.yaml");
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(cfg.validation, ValidationPolicy::Lenient);
    }

    const UNDECLARED_PATH_PARAM: &str = r##"
openapi: "3.0.3"
info: { title: t, version: "1" }
paths:
  /pets/{petId}:
    get:
      responses:
        "200": { description: ok }
"##;

    #[test]
    fn check_reports_issues_once_and_honours_strict() {
        let spec = parse::from_yaml(UNDECLARED_PATH_PARAM).unwrap();

        let mut cfg = OasirConfig::default();
        let (issues, ir) = check(&spec, &cfg).unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert_eq!(ir.operations().count(), 1);

        cfg.validation = ValidationPolicy::Strict;
        let err = check(&spec, &cfg).unwrap_err();
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn summary_lists_models_and_operations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mini.yaml");
        fs::write(&path, SPEC).unwrap();

        let cfg = OasirConfig::default();
        let spec = load_spec(Some(path), &cfg).unwrap();
        let ir = resolve(&spec, &cfg).unwrap();
        let summary = build_inspect_summary(&ir);

        assert_eq!(summary["info"]["title"], "Mini");
        assert_eq!(summary["models"][0]["name"], "User");
        assert_eq!(summary["models"][0]["kind"], "object");
        let op = &summary["operationGroups"][0]["operations"][0];
        assert_eq!(op["operationId"], "getUser");
        assert_eq!(op["method"], "GET");
        assert_eq!(op["returnType"], "User");
        assert_eq!(summary["operationGroups"][0]["className"], "UsersApi");
    }
}
