use clap::Parser;
use indexmap::IndexMap;
use openapi_mock_engine::{
    cli::{check_value, Args, Command},
    document::DocumentParser,
    format::{generate_value, stringify, value_matches_format},
    template::TemplateConfig,
    ApiOperation, Error, Result,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use tracing::Level;

/// Reads a YAML (`.yaml`/`.yml`) or JSON file. YAML is routed through
/// `serde_yaml::Value` so that non-string keys such as `200:` become strings.
fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(Error::from(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Input path {path:?} is not a readable file"),
        )));
    }
    tracing::debug!("Reading {path:?}");
    let content = fs::read_to_string(path)?;
    let value: Value = if path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
    {
        serde_json::to_value(serde_yaml::from_str::<serde_yaml::Value>(&content)?)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(serde_json::from_value(value)?)
}

fn load_template(path: &Path) -> Result<TemplateConfig> {
    let template: TemplateConfig = read_config(path)?;
    template.validate()?;
    Ok(template)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Resolve {
            input,
            strategy,
            output,
        } => {
            let document: Value = read_config(&input)?;
            let parser = DocumentParser::new(&document)?;
            let operations: IndexMap<String, ApiOperation> = parser
                .parse(strategy)?
                .into_iter()
                .map(|operation| (operation.api_key(parser.base_path()), operation))
                .collect();
            let rendered = serde_yaml::to_string(&operations)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, rendered)?;
                    tracing::info!("Resolved {} operations to {path:?}", operations.len());
                }
                None => print!("{rendered}"),
            }
            Ok(true)
        }
        Command::Generate {
            config,
            name,
            value_type,
        } => {
            let template = load_template(&config)?;
            let format = template
                .get_format(&name)
                .ok_or_else(|| Error::MissingTemplateFormat(name.clone()))?;
            let value = generate_value(format, value_type, Some(template.formats()))?;
            println!("{}", stringify(&value));
            Ok(true)
        }
        Command::Check {
            config,
            name,
            value_type,
            value,
            json,
        } => {
            let template = load_template(&config)?;
            let format = template
                .get_format(&name)
                .ok_or_else(|| Error::MissingTemplateFormat(name.clone()))?;
            let value = check_value(value, json)?;
            let matched = value_matches_format(format, value_type, &value, Some(template.formats()))?;
            if matched {
                println!("'{}' matches format '{name}'", stringify(&value));
            } else {
                println!(
                    "'{}' does not match format '{name}', expected {}",
                    stringify(&value),
                    format.expect_format_log_msg(value_type)
                );
            }
            Ok(matched)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
