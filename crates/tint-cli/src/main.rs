//! tint: restyle the layer groups of an SVG from a theme file.
//!
//! A thin driver over `tint-core`: one document in, one document (or a
//! report) out. Set `RUST_LOG=debug` to see which groups were kept, dropped
//! or skipped.

use std::io::Read;
use tint_core::{
    LabelSpec, LayerSelector, LintSeverity, RestyleConfig, Theme, TintError, lint_style_map,
    locate_groups, parse_document, restyle_document,
};

#[derive(Debug)]
enum CliError {
    Help,
    Usage(&'static str),
    Io(std::io::Error),
    Tint(TintError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Help => write!(f, "{}", usage()),
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Tint(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TintError> for CliError {
    fn from(value: TintError) -> Self {
        Self::Tint(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Groups,
    Apply,
    Lint,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    json: bool,
    theme: Option<String>,
    label: Option<String>,
    no_label: bool,
    layer_id: Option<String>,
    out: Option<String>,
    input: Option<String>,
}

fn usage() -> &'static str {
    "tint\n\
\n\
USAGE:\n\
  tint groups [--json] [<svg>|-]\n\
  tint apply --theme <theme.json> [--label <text>|--no-label] [--layer-id <id>] [--out <path>] [<svg>|-]\n\
  tint lint --theme <theme.json> [<svg>|-]\n\
\n\
NOTES:\n\
  - If <svg> is omitted or '-', input is read from stdin.\n\
  - groups lists the second-level <g> identifiers in document order.\n\
  - apply rebuilds the first <g> (or --layer-id) from the theme's groups;\n\
    groups the theme does not name are dropped. The default label is\n\
    'Theme: <name>'.\n\
  - apply prints SVG to stdout by default; use --out to write a file.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut positional = 0usize;
    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let is_positional = a == "-" || !a.starts_with('-');
        let first_positional = is_positional && positional == 0;
        if is_positional {
            positional += 1;
        }
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Help),
            "groups" if first_positional => args.command = Command::Groups,
            "apply" if first_positional => args.command = Command::Apply,
            "lint" if first_positional => args.command = Command::Lint,
            "--json" => args.json = true,
            "--no-label" => args.no_label = true,
            "--theme" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.theme = Some(path.clone());
            }
            "--label" => {
                let Some(text) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.label = Some(text.clone());
            }
            "--layer-id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.layer_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.command != Command::Groups && args.theme.is_none() {
        return Err(CliError::Usage(usage()));
    }
    if args.no_label && args.label.is_some() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn load_theme(path: Option<&str>) -> Result<Theme, CliError> {
    let Some(path) = path else {
        return Err(CliError::Usage(usage()));
    };
    Ok(Theme::from_json(&std::fs::read_to_string(path)?)?)
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Groups => {
            let doc = parse_document(&text)?;
            let keys: Vec<String> = locate_groups(&doc).into_iter().map(|g| g.key).collect();
            if args.json {
                serde_json::to_writer_pretty(std::io::stdout().lock(), &keys)?;
                println!();
            } else {
                for key in keys {
                    println!("{key}");
                }
            }
        }
        Command::Apply => {
            let theme = load_theme(args.theme.as_deref())?;
            let label = match (&args.label, args.no_label) {
                (_, true) => None,
                (Some(text), false) => Some(LabelSpec::new(text.clone())),
                (None, false) => Some(LabelSpec::new(format!("Theme: {}", theme.name))),
            };
            let config = RestyleConfig {
                selector: args
                    .layer_id
                    .clone()
                    .map_or(LayerSelector::FirstGroup, LayerSelector::ById),
                label,
            };
            let out = restyle_document(&text, &theme.style_map(), &config)?;
            write_text(&out, args.out.as_deref())?;
        }
        Command::Lint => {
            let theme = load_theme(args.theme.as_deref())?;
            let doc = parse_document(&text)?;
            for diag in lint_style_map(&doc, &theme.style_map()) {
                let severity = match diag.severity {
                    LintSeverity::Warning => "warning",
                    LintSeverity::Info => "info",
                };
                println!("{severity}[{}] {}: {}", diag.rule, diag.group, diag.message);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Help) => {
            print!("{}", usage());
            return;
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    log::debug!("command {:?}", args.command);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
